/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Tagged metadata attached to a bitmap
//!
//! Tags are grouped by [`MetadataModel`] and keyed by a name within that model.
//! Codecs write tags while decoding (e.g. the GIF frame position) and read them
//! back while encoding.
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::pixel::Rgba;

/// Group a tag belongs to
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum MetadataModel {
    /// Free text comments
    Comments,
    /// Animation and frame placement tags
    Animation,
    /// Format specific tags that have no common model
    Custom
}

/// Value of a single tag
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TagValue {
    Byte(u8),
    Short(u16),
    Long(u32),
    Ascii(String),
    Palette(Vec<Rgba>)
}

impl TagValue {
    /// Widen any integer tag to `u32`
    pub const fn as_u32(&self) -> Option<u32> {
        match self {
            TagValue::Byte(v) => Some(*v as u32),
            TagValue::Short(v) => Some(*v as u32),
            TagValue::Long(v) => Some(*v),
            _ => None
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Ascii(s) => Some(s),
            _ => None
        }
    }
    pub fn as_palette(&self) -> Option<&[Rgba]> {
        match self {
            TagValue::Palette(p) => Some(p),
            _ => None
        }
    }
}

/// Ordered tag store
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Metadata {
    tags: BTreeMap<(MetadataModel, String), TagValue>
}

impl Metadata {
    pub fn new() -> Metadata {
        Metadata::default()
    }
    /// Insert or replace a tag
    pub fn set(&mut self, model: MetadataModel, key: &str, value: TagValue) {
        self.tags.insert((model, String::from(key)), value);
    }
    pub fn get(&self, model: MetadataModel, key: &str) -> Option<&TagValue> {
        self.tags.get(&(model, String::from(key)))
    }
    /// Integer tag, `None` if absent or not an integer
    pub fn get_u32(&self, model: MetadataModel, key: &str) -> Option<u32> {
        self.get(model, key).and_then(TagValue::as_u32)
    }
    pub fn remove(&mut self, model: MetadataModel, key: &str) -> Option<TagValue> {
        self.tags.remove(&(model, String::from(key)))
    }
    /// Number of tags in a model
    pub fn count(&self, model: MetadataModel) -> usize {
        self.iter_model(model).count()
    }
    /// Tags of one model in key order
    pub fn iter_model(&self, model: MetadataModel) -> impl Iterator<Item = (&str, &TagValue)> {
        self.tags
            .iter()
            .filter(move |((m, _), _)| *m == model)
            .map(|((_, k), v)| (k.as_str(), v))
    }
    pub fn iter(&self) -> impl Iterator<Item = (MetadataModel, &str, &TagValue)> {
        self.tags.iter().map(|((m, k), v)| (*m, k.as_str(), v))
    }
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn models_are_separate() {
        let mut meta = Metadata::new();
        meta.set(MetadataModel::Animation, "Loop", TagValue::Long(0));
        meta.set(MetadataModel::Comments, "Comment0", TagValue::Ascii("hi".into()));
        meta.set(MetadataModel::Comments, "Comment1", TagValue::Ascii("there".into()));

        assert_eq!(meta.count(MetadataModel::Comments), 2);
        assert_eq!(meta.get_u32(MetadataModel::Animation, "Loop"), Some(0));
        assert_eq!(meta.get_u32(MetadataModel::Comments, "Loop"), None);

        let keys: Vec<&str> = meta.iter_model(MetadataModel::Comments).map(|(k, _)| k).collect();
        assert_eq!(keys, ["Comment0", "Comment1"]);
    }
}
