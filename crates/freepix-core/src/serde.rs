/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![cfg(feature = "serde")]

use alloc::format;

use serde::ser::*;

use crate::bitmap::{MetadataModel, ScanOrder};
use crate::errors::ErrorKind;
use crate::pixel::{ChannelMasks, Rgba};

impl Serialize for ScanOrder {
    #[allow(clippy::uninlined_format_args)]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        // scan order serialization is simply it's debug value
        serializer.serialize_str(&format!("{:?}", self))
    }
}

impl Serialize for MetadataModel {
    #[allow(clippy::uninlined_format_args)]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        serializer.serialize_str(&format!("{:?}", self))
    }
}

impl Serialize for ErrorKind {
    #[allow(clippy::uninlined_format_args)]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        serializer.serialize_str(&format!("{:?}", self))
    }
}

impl Serialize for Rgba {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut seq = serializer.serialize_tuple(4)?;
        seq.serialize_element(&self.red)?;
        seq.serialize_element(&self.green)?;
        seq.serialize_element(&self.blue)?;
        seq.serialize_element(&self.alpha)?;
        seq.end()
    }
}

impl Serialize for ChannelMasks {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("ChannelMasks", 3)?;
        state.serialize_field("red", &self.red)?;
        state.serialize_field("green", &self.green)?;
        state.serialize_field("blue", &self.blue)?;
        state.end()
    }
}
