/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Animation playback
//!
//! Renders frame `N` of an animation the way a viewer shows it after
//! playing frames `0..=N`, onto a 32 bit canvas the size of the logical
//! screen.
//!
//! Replay starts from the latest frame that makes everything before it
//! invisible, frames before that point are never decoded.
use alloc::vec::Vec;

use freepix_core::bitmap::{Bitmap, BitmapError, MetadataModel, TagValue};
use freepix_core::pixel::{self, Rgba};

use crate::enums::DisposalMethod;
use crate::raster::get_index;
use crate::tags::FRAME_TIME;

/// Placement and disposal of one frame, available without decoding it
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FrameInfo {
    pub left:        usize,
    pub top:         usize,
    pub width:       usize,
    pub height:      usize,
    pub disposal:    DisposalMethod,
    /// Frame has a transparent palette index
    pub transparent: bool,
    /// Display time in milliseconds
    pub delay_ms:    u32
}

impl FrameInfo {
    fn covers(&self, width: usize, height: usize) -> bool {
        self.left == 0 && self.top == 0 && self.width >= width && self.height >= height
    }
}

/// Frames an animation is composed from
pub trait FrameSource {
    type Error: From<BitmapError>;

    /// Logical screen size
    fn canvas_size(&self) -> (usize, usize);
    /// Color the canvas starts with, erased rectangles return to it
    fn background(&self) -> Rgba;
    fn frame_info(&mut self, index: usize) -> Result<FrameInfo, Self::Error>;
    /// Decode frame `index` as a palettized bitmap with the frame's own size
    ///
    /// The first fully transparent entry of its transparency table marks
    /// pixels that leave the canvas untouched.
    fn decode_frame(&mut self, index: usize) -> Result<Bitmap, Self::Error>;
}

/// First frame replay has to start from to show frame `infos.len() - 1`
fn restart_point(infos: &[FrameInfo], width: usize, height: usize) -> usize {
    let last = infos.len().saturating_sub(1);

    for (index, info) in infos.iter().enumerate().rev() {
        if !info.covers(width, height) {
            continue;
        }
        if index != last && info.disposal == DisposalMethod::Background {
            // the whole canvas is erased once this frame is done
            return index + 1;
        }
        if !info.transparent {
            return index;
        }
    }
    0
}

fn fill_rect(canvas: &mut Bitmap, info: &FrameInfo, color: Rgba) {
    let (canvas_width, canvas_height) = canvas.dimensions();
    let right = canvas_width.min(info.left.saturating_add(info.width));

    for top in info.top..canvas_height.min(info.top.saturating_add(info.height)) {
        if let Some(row) = canvas.row_mut(canvas_height - 1 - top) {
            for x in info.left..right {
                pixel::put_rgba(&mut row[x * 4..x * 4 + 4], color);
            }
        }
    }
}

fn draw_frame(canvas: &mut Bitmap, frame: &Bitmap, info: &FrameInfo) {
    let (canvas_width, canvas_height) = canvas.dimensions();
    let depth = frame.bits_per_pixel();
    let transparent = frame.transparent_index();
    let palette = frame.palette();

    for y in 0..frame.height() {
        let top = info.top + y;
        if top >= canvas_height {
            break;
        }
        let (Some(src), Some(dst)) = (
            frame.row(frame.height() - 1 - y),
            canvas.row_mut(canvas_height - 1 - top)
        ) else {
            break;
        };
        for x in 0..frame.width() {
            let column = info.left + x;
            if column >= canvas_width {
                break;
            }
            let index = usize::from(get_index(src, x, depth));
            if transparent == Some(index) {
                continue;
            }
            let color = palette.get(index).copied().unwrap_or_default();
            pixel::put_rgba(
                &mut dst[column * 4..column * 4 + 4],
                Rgba { alpha: 255, ..color }
            );
        }
    }
}

/// Render frame `index` as it appears during playback
///
/// The result is a 32 bit bitmap the size of the canvas carrying the
/// frame's own display time.
pub fn compose<S: FrameSource>(source: &mut S, index: usize) -> Result<Bitmap, S::Error> {
    let (width, height) = source.canvas_size();
    let background = source.background();

    let infos = (0..=index)
        .map(|i| source.frame_info(i))
        .collect::<Result<Vec<FrameInfo>, S::Error>>()?;

    let mut canvas = Bitmap::allocate(width, height, 32)?;
    let everything = FrameInfo {
        left: 0,
        top: 0,
        width,
        height,
        disposal: DisposalMethod::None,
        transparent: false,
        delay_ms: 0
    };
    fill_rect(&mut canvas, &everything, background);

    for (i, info) in infos
        .iter()
        .enumerate()
        .skip(restart_point(&infos, width, height))
    {
        if i != index && info.disposal == DisposalMethod::Background {
            // drawn then erased, only the erase is visible
            fill_rect(&mut canvas, info, background);
            continue;
        }
        let frame = source.decode_frame(i)?;
        draw_frame(&mut canvas, &frame, info);
    }

    canvas.set_alpha_channel(true);
    canvas.metadata_mut().set(
        MetadataModel::Animation,
        FRAME_TIME,
        TagValue::Long(infos[index].delay_ms)
    );
    Ok(canvas)
}
