/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Formats that are recognised but not decoded here
//!
//! Their codecs are delegated to third party libraries, these plugins
//! only take part in detection and report that no decoder is available
//! when asked to load.
use freepix_core::bytestream::ByteReaderTrait;

use crate::codecs::read_prefix;
use crate::plugin::{FormatDescriptor, FormatPlugin};

/// A format detected by matching one of several leading byte patterns
#[derive(Copy, Clone, Debug)]
pub struct SignatureFormat {
    descriptor: FormatDescriptor,
    signatures: &'static [&'static [u8]]
}

impl SignatureFormat {
    pub const fn new(
        descriptor: FormatDescriptor, signatures: &'static [&'static [u8]]
    ) -> SignatureFormat {
        SignatureFormat {
            descriptor,
            signatures
        }
    }
}

impl FormatPlugin for SignatureFormat {
    fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    fn validate(&self, stream: &mut dyn ByteReaderTrait) -> bool {
        let mut prefix = [0; 16];
        let read = read_prefix(stream, &mut prefix);
        let prefix = &prefix[..read];

        self.signatures
            .iter()
            .any(|signature| prefix.starts_with(signature))
    }
}

pub const JPEG: SignatureFormat = SignatureFormat::new(
    FormatDescriptor {
        name:        "JPEG",
        description: "JPEG - JFIF Compliant",
        extensions:  "jpg,jif,jpeg,jpe",
        mime:        "image/jpeg",
        signature:   Some(&[0xFF, 0xD8, 0xFF])
    },
    &[&[0xFF, 0xD8, 0xFF]]
);

pub const PNG: SignatureFormat = SignatureFormat::new(
    FormatDescriptor {
        name:        "PNG",
        description: "Portable Network Graphics",
        extensions:  "png",
        mime:        "image/png",
        signature:   Some(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
    },
    &[&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]]
);

/// The generic tag based container, camera raw files share its magic
pub const TIFF: SignatureFormat = SignatureFormat::new(
    FormatDescriptor {
        name:        "TIFF",
        description: "Tagged Image File Format",
        extensions:  "tif,tiff",
        mime:        "image/tiff",
        signature:   Some(b"II*\0")
    },
    &[b"II*\0", b"MM\0*", b"II+\0", b"MM\0+"]
);

pub const J2K: SignatureFormat = SignatureFormat::new(
    FormatDescriptor {
        name:        "J2K",
        description: "JPEG-2000 codestream",
        extensions:  "j2k,j2c",
        mime:        "image/j2k",
        signature:   Some(&[0xFF, 0x4F, 0xFF, 0x51])
    },
    &[&[0xFF, 0x4F, 0xFF, 0x51]]
);

pub const JP2: SignatureFormat = SignatureFormat::new(
    FormatDescriptor {
        name:        "JP2",
        description: "JPEG-2000 File Format",
        extensions:  "jp2",
        mime:        "image/jp2",
        signature:   Some(&[0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20])
    },
    &[&[
        0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A
    ]]
);

/// Camera raw files, several of which start like a TIFF file
pub const RAW: SignatureFormat = SignatureFormat::new(
    FormatDescriptor {
        name:        "RAW",
        description: "RAW camera image",
        extensions:  "3fr,arw,bay,bmq,cap,cine,cr2,crw,cs1,dc2,dcr,drf,dsc,dng,erf,fff,ia,iiq,k25,kc2,kdc,mdc,mef,mos,mrw,nef,nrw,orf,pef,ptx,pxn,qtk,raf,raw,rdc,rw2,rwl,rwz,sr2,srf,srw,sti,x3f",
        mime:        "image/x-dcraw",
        signature:   None
    },
    &[
        // Canon CR2
        b"II*\0\x10\0\0\0CR",
        // Canon CRW
        b"II\x1a\0\0\0HEAPCCDR",
        // Minolta MRW
        b"\0MRM",
        // Olympus ORF
        b"IIRO",
        b"IIRS",
        b"MMOR",
        // Fuji RAF
        b"FUJIFILMCCD-RAW",
        // Panasonic RW2
        b"IIU\0",
        // Sigma X3F
        b"FOVb"
    ]
);
