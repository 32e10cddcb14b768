// src/effect/tests.rs

#[cfg(test)]
mod effect_tests {
    use crate::color::Rgba;
    use crate::effect::{
        Effect, Glow, Gradient, Identity, Outline, PropertyError, PropertyKind, PropertyValue,
        Shadow,
    };
    use crate::generator::canvas::{Mask, Page};
    use crate::generator::{FontInfo, GlyphRect, Padding};
    use std::sync::{Arc, Mutex};

    fn info() -> FontInfo {
        FontInfo {
            size: 10.0,
            ascent: 8,
            descent: 2,
            line_height: 10,
            padding: Padding::ZERO,
        }
    }

    fn rect_at(x: u32, y: u32, w: u32, h: u32) -> GlyphRect {
        GlyphRect {
            codepoint: 65,
            glyph: 1,
            x,
            y,
            width: w,
            height: h,
            image_x: x,
            image_y: y,
            image_width: w,
            image_height: h,
            x_offset: 0,
            y_offset: 0,
            advance: w as i32,
        }
    }

    fn dot() -> Mask {
        Mask {
            width: 1,
            height: 1,
            data: vec![255],
        }
    }

    #[test_log::test]
    fn make_copy_carries_values_not_identity() {
        let mut original = Outline::new(3, Rgba::opaque(10, 20, 30));
        let mut copy = original.make_copy();
        assert_eq!(copy.name(), "outline");
        assert_eq!(copy.property(Outline::WIDTH).unwrap().value(), PropertyValue::Int(3));
        assert_eq!(
            copy.property(Outline::COLOR).unwrap().as_color(),
            Rgba::opaque(10, 20, 30)
        );

        copy.set_property(Outline::WIDTH, PropertyValue::Int(5)).unwrap();
        assert_eq!(original.property(Outline::WIDTH).unwrap().as_int(), 3);
        original.set_property(Outline::WIDTH, PropertyValue::Int(7)).unwrap();
        assert_eq!(copy.property(Outline::WIDTH).unwrap().as_int(), 5);
    }

    #[test_log::test]
    fn create_new_has_defaults() {
        let shadow = Shadow::new(-5, 9, Rgba::WHITE);
        let fresh = shadow.create_new();
        assert_eq!(fresh.name(), "shadow");
        assert_eq!(fresh.property(Shadow::OFFSET_X).unwrap().as_int(), 1);
        assert_eq!(fresh.property(Shadow::OFFSET_Y).unwrap().as_int(), 1);
    }

    #[test_log::test]
    fn callbacks_fire_on_change_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut glow = Glow::default();
        let sink = Arc::clone(&seen);
        let id = glow.properties_mut()[0].add_value_changed_callback(Arc::new(move |name, v| {
            sink.lock().unwrap().push((name.to_string(), v));
        }));

        glow.set_property(Glow::RADIUS, PropertyValue::Int(5)).unwrap();
        glow.set_property(Glow::RADIUS, PropertyValue::Int(5)).unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("radius".to_string(), PropertyValue::Int(5))]
        );

        assert!(glow.properties_mut()[0].remove_value_changed_callback(id));
        assert!(!glow.properties_mut()[0].remove_value_changed_callback(id));
        glow.set_property(Glow::RADIUS, PropertyValue::Int(6)).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test_log::test]
    fn copies_do_not_share_callbacks() {
        let count = Arc::new(Mutex::new(0));
        let mut outline = Outline::default();
        let sink = Arc::clone(&count);
        outline.properties_mut()[0].add_value_changed_callback(Arc::new(move |_, _| {
            *sink.lock().unwrap() += 1;
        }));
        let mut copy = outline.make_copy();
        copy.set_property(Outline::WIDTH, PropertyValue::Int(4)).unwrap();
        assert_eq!(*count.lock().unwrap(), 0);
    }

    #[test_log::test]
    fn rejects_wrong_kind_range_and_name() {
        let mut outline = Outline::default();
        assert_eq!(
            outline.set_property(Outline::WIDTH, PropertyValue::Color(Rgba::WHITE)),
            Err(PropertyError::TypeMismatch {
                name: "width",
                expected: PropertyKind::Int,
                found: PropertyKind::Color,
            })
        );
        assert!(matches!(
            outline.set_property(Outline::WIDTH, PropertyValue::Int(-1)),
            Err(PropertyError::OutOfRange { .. })
        ));
        assert_eq!(
            outline.set_property("blur", PropertyValue::Int(1)),
            Err(PropertyError::Unknown("blur".to_string()))
        );
        assert_eq!(outline.property(Outline::WIDTH).unwrap().as_int(), 1);
    }

    #[test_log::test]
    fn identity_asks_nothing() {
        let identity = Identity::new();
        assert!(identity.properties().is_empty());
        assert_eq!(identity.create_renderer().padding(), Padding::ZERO);
        assert_eq!(identity.make_copy().name(), "identity");
    }

    #[test_log::test]
    fn padding_follows_parameters() {
        assert_eq!(Outline::new(2, Rgba::BLACK).create_renderer().padding(), Padding::uniform(2));
        assert_eq!(Glow::new(4, Rgba::BLACK).create_renderer().padding(), Padding::uniform(4));
        assert_eq!(
            Shadow::new(-2, 3, Rgba::BLACK).create_renderer().padding(),
            Padding {
                top: 0,
                left: 2,
                bottom: 3,
                right: 0
            }
        );
        assert_eq!(Gradient::default().create_renderer().padding(), Padding::ZERO);
    }

    #[test_log::test]
    fn renderer_snapshots_parameters() {
        let mut outline = Outline::new(1, Rgba::BLACK);
        let renderer = outline.create_renderer();
        outline.set_property(Outline::WIDTH, PropertyValue::Int(6)).unwrap();
        assert_eq!(renderer.padding(), Padding::uniform(1));
    }

    #[test_log::test]
    fn outline_surrounds_the_glyph() {
        let mut page = Page::new(5, 5);
        let mut renderer = Outline::new(1, Rgba::opaque(255, 0, 0)).create_renderer();
        renderer.pre_glyph_render(&mut page, &info(), &rect_at(2, 2, 1, 1), &dot());
        for (x, y) in [(1, 2), (3, 2), (2, 1), (2, 3), (2, 2)] {
            assert_eq!(page.pixel(x, y), Rgba::opaque(255, 0, 0), "at {},{}", x, y);
        }
        assert_eq!(page.pixel(0, 0), Rgba::TRANSPARENT);
    }

    #[test_log::test]
    fn shadow_draws_at_offset() {
        let mut page = Page::new(5, 5);
        let mut renderer = Shadow::new(2, -1, Rgba::BLACK).create_renderer();
        renderer.pre_glyph_render(&mut page, &info(), &rect_at(1, 2, 1, 1), &dot());
        assert_eq!(page.pixel(3, 1), Rgba::BLACK);
        assert_eq!(page.pixel(1, 2), Rgba::TRANSPARENT);
    }

    #[test_log::test]
    fn glow_spreads_past_the_glyph() {
        let mut page = Page::new(9, 9);
        let mut renderer = Glow::new(2, Rgba::WHITE).create_renderer();
        renderer.pre_glyph_render(&mut page, &info(), &rect_at(4, 4, 1, 1), &dot());
        assert!(page.pixel(4, 4).a > 0);
        assert!(page.pixel(3, 4).a > 0);
        assert!(page.pixel(4, 4).a >= page.pixel(2, 4).a);
        assert_eq!(page.pixel(0, 0), Rgba::TRANSPARENT);
    }

    #[test_log::test]
    fn gradient_runs_top_to_bottom_of_line() {
        let top = Rgba::opaque(255, 0, 0);
        let bottom = Rgba::opaque(0, 0, 255);
        let mut renderer = Gradient::new(top, bottom).create_renderer();
        let mut page = Page::new(2, 10);
        let info = info();
        renderer.pre_page_render(&mut page, &info);

        let mask = Mask {
            width: 1,
            height: 10,
            data: vec![255; 10],
        };
        renderer.post_glyph_render(&mut page, &info, &rect_at(0, 0, 1, 10), &mask);
        assert_eq!(page.pixel(0, 0), top);
        assert_eq!(page.pixel(0, 9), bottom);
        assert!(page.pixel(0, 4).r > page.pixel(0, 6).r);
        assert_eq!(page.pixel(1, 0), Rgba::TRANSPARENT);
    }
}
