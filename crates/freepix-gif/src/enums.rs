/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Different GIF disposal methods
///
/// What happens to a frame's rectangle before the next frame is drawn
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DisposalMethod {
    /// No disposal specified, treated like [`InPlace`](Self::InPlace)
    None = 0,
    /// Leave the frame on the canvas
    InPlace = 1,
    /// Erase the frame's rectangle to the background color
    Background = 2,
    /// Restore what was under the frame
    Restore = 3
}

impl DisposalMethod {
    pub fn from_flags(value: u8) -> DisposalMethod {
        match value {
            1 => DisposalMethod::InPlace,
            2 => DisposalMethod::Background,
            3 => DisposalMethod::Restore,
            _ => DisposalMethod::None
        }
    }
    /// Value of the three bit graphic control field
    pub const fn to_flags(self) -> u8 {
        self as u8
    }
}
