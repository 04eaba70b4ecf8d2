/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Metadata keys GIF frames are described with
//!
//! All keys live in [`MetadataModel::Animation`](freepix_core::bitmap::MetadataModel::Animation),
//! comments are stored as `Comment0`, `Comment1`, ... in the comments model.
//!
//! The logical screen keys, the global palette and the loop count are only
//! present on the first frame.

/// Horizontal offset of the frame on the logical screen (Short)
pub const FRAME_LEFT: &str = "FrameLeft";
/// Vertical offset of the frame on the logical screen (Short)
pub const FRAME_TOP: &str = "FrameTop";
/// Frame uses the global palette (Byte)
pub const NO_LOCAL_PALETTE: &str = "NoLocalPalette";
/// Frame rows are stored interlaced (Byte)
pub const INTERLACED: &str = "Interlaced";
/// Display time in milliseconds (Long)
pub const FRAME_TIME: &str = "FrameTime";
/// See [`DisposalMethod`](crate::DisposalMethod) (Byte)
pub const DISPOSAL_METHOD: &str = "DisposalMethod";
/// Logical screen width (Short)
pub const LOGICAL_WIDTH: &str = "LogicalWidth";
/// Logical screen height (Short)
pub const LOGICAL_HEIGHT: &str = "LogicalHeight";
/// Global color table (Palette)
pub const GLOBAL_PALETTE: &str = "GlobalPalette";
/// Number of times the animation plays, `0` is forever (Long)
pub const LOOP: &str = "Loop";
/// Prefix of comment keys
pub const COMMENT_PREFIX: &str = "Comment";
