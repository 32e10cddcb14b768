// src/effect/property.rs

//! Named, typed effect parameters with change notification.

use crate::color::Rgba;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Int(i32),
    Float(f32),
    Color(Rgba),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::Color(_) => PropertyKind::Color,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Int(v) => write!(f, "{}", v),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::Color(c) => write!(f, "{}", c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Int,
    Float,
    Color,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyError {
    #[error("no property named '{0}'")]
    Unknown(String),
    #[error("property '{name}' expects {expected:?}, got {found:?}")]
    TypeMismatch {
        name: &'static str,
        expected: PropertyKind,
        found: PropertyKind,
    },
    #[error("property '{name}' value {value} is outside {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
}

/// Called with the property name and its new value.
pub type ChangeCallback = Arc<dyn Fn(&str, PropertyValue) + Send + Sync>;

/// Handle returned when registering a change callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

pub struct Property {
    name: &'static str,
    value: PropertyValue,
    range: Option<(f32, f32)>,
    callbacks: Vec<(CallbackId, ChangeCallback)>,
    next_id: u64,
}

impl Property {
    fn with(name: &'static str, value: PropertyValue, range: Option<(f32, f32)>) -> Self {
        Self {
            name,
            value,
            range,
            callbacks: Vec::new(),
            next_id: 0,
        }
    }

    pub fn int(name: &'static str, value: i32, min: i32, max: i32) -> Self {
        Self::with(name, PropertyValue::Int(value), Some((min as f32, max as f32)))
    }

    pub fn float(name: &'static str, value: f32, min: f32, max: f32) -> Self {
        Self::with(name, PropertyValue::Float(value), Some((min, max)))
    }

    pub fn color(name: &'static str, value: Rgba) -> Self {
        Self::with(name, PropertyValue::Color(value), None)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn value(&self) -> PropertyValue {
        self.value
    }

    pub fn kind(&self) -> PropertyKind {
        self.value.kind()
    }

    pub fn range(&self) -> Option<(f32, f32)> {
        self.range
    }

    /// Replaces the value. Callbacks fire only when the value changes.
    pub fn set_value(&mut self, value: PropertyValue) -> Result<(), PropertyError> {
        if value.kind() != self.kind() {
            return Err(PropertyError::TypeMismatch {
                name: self.name,
                expected: self.kind(),
                found: value.kind(),
            });
        }
        let numeric = match value {
            PropertyValue::Int(v) => Some(v as f32),
            PropertyValue::Float(v) => Some(v),
            PropertyValue::Color(_) => None,
        };
        if let (Some(v), Some((min, max))) = (numeric, self.range) {
            if !(min..=max).contains(&v) {
                return Err(PropertyError::OutOfRange {
                    name: self.name,
                    value: v,
                    min,
                    max,
                });
            }
        }
        if value != self.value {
            self.value = value;
            for (_, cb) in &self.callbacks {
                cb(self.name, value);
            }
        }
        Ok(())
    }

    pub fn add_value_changed_callback(&mut self, callback: ChangeCallback) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    pub fn remove_value_changed_callback(&mut self, id: CallbackId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(cid, _)| *cid != id);
        self.callbacks.len() != before
    }

    pub fn as_int(&self) -> i32 {
        match self.value {
            PropertyValue::Int(v) => v,
            PropertyValue::Float(v) => v.round() as i32,
            PropertyValue::Color(_) => 0,
        }
    }

    pub fn as_float(&self) -> f32 {
        match self.value {
            PropertyValue::Int(v) => v as f32,
            PropertyValue::Float(v) => v,
            PropertyValue::Color(_) => 0.0,
        }
    }

    pub fn as_color(&self) -> Rgba {
        match self.value {
            PropertyValue::Color(c) => c,
            _ => Rgba::TRANSPARENT,
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("range", &self.range)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
