//! Per frame properties, used to carry the source format of packed frames

use crate::FormatId;
use std::collections::BTreeMap;

/// Key of the property holding the [`FormatId`] a packed frame was created from
pub const P2P_INPUT_FORMAT: &str = "_P2PInputFormat";

#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropError {
    #[error("property {0:?} is not set")]
    Unset(String),

    #[error("property {0:?} does not hold an integer")]
    NotAnInteger(String),
}

/// Key-value map attached to every frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameProps {
    map: BTreeMap<String, PropValue>,
}

impl FrameProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a property
    pub fn set(&mut self, key: impl Into<String>, value: PropValue) {
        self.map.insert(key.into(), value);
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i64) {
        self.set(key, PropValue::Int(value));
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.map.get(key)
    }

    pub fn get_int(&self, key: &str) -> Result<i64, PropError> {
        match self.map.get(key) {
            Some(PropValue::Int(value)) => Ok(*value),
            Some(_) => Err(PropError::NotAnInteger(key.into())),
            None => Err(PropError::Unset(key.into())),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Record the format a packed frame was created from
    pub fn set_format_tag(&mut self, id: FormatId) {
        self.set_int(P2P_INPUT_FORMAT, i64::from(id));
    }

    /// Read the raw format tag of a packed frame
    ///
    /// The value is not validated, see [`Packing::for_format_tag`](crate::Packing::for_format_tag).
    pub fn format_tag(&self) -> Result<i64, PropError> {
        self.get_int(P2P_INPUT_FORMAT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixelFormat;

    #[test]
    fn format_tag() {
        let mut props = FrameProps::new();
        assert_eq!(
            props.format_tag(),
            Err(PropError::Unset(P2P_INPUT_FORMAT.into()))
        );

        props.set_format_tag(PixelFormat::RGB30.id());
        assert_eq!(props.format_tag(), Ok(0x200A_0000));

        // replaces
        props.set_format_tag(PixelFormat::RGB48.id());
        assert_eq!(props.format_tag(), Ok(0x2010_0000));
        assert_eq!(
            props.get(P2P_INPUT_FORMAT),
            Some(&PropValue::Int(0x2010_0000))
        );
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn format_tag_of_wrong_type() {
        let mut props = FrameProps::new();
        props.set(P2P_INPUT_FORMAT, PropValue::Float(1.0));

        assert_eq!(
            props.format_tag(),
            Err(PropError::NotAnInteger(P2P_INPUT_FORMAT.into()))
        );
    }

    #[test]
    fn format_tag_is_read_unvalidated() {
        let mut props = FrameProps::new();
        props.set_int(P2P_INPUT_FORMAT, -1);

        assert_eq!(props.format_tag(), Ok(-1));
    }
}
