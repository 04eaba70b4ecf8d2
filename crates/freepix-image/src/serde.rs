/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
#![cfg(feature = "serde-support")]

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::plugin::{FormatDescriptor, FormatId};

impl Serialize for FormatDescriptor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        const STRUCT_FIELDS: usize = 4;
        let mut state = serializer.serialize_struct("FormatDescriptor", STRUCT_FIELDS)?;

        let extensions: Vec<&str> = self.extensions().collect();

        state.serialize_field("name", self.name)?;
        state.serialize_field("description", self.description)?;
        state.serialize_field("extensions", extensions.as_slice())?;
        state.serialize_field("mime", self.mime)?;

        state.end()
    }
}

impl Serialize for FormatId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        serializer.serialize_u64(self.index() as u64)
    }
}
