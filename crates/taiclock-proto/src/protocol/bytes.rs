// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use crate::error::ParseError;
use crate::tai64::Tain;

use super::traits::ensure_len;
use super::{ConstPackedSizeBytes, FromBytes};

impl ConstPackedSizeBytes for Tain {
    const PACKED_SIZE_BYTES: usize = 12;
}

impl FromBytes for Tain {
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError> {
        ensure_len::<Self>(buf.len())?;
        let mut packed = [0u8; 12];
        packed.copy_from_slice(&buf[..Self::PACKED_SIZE_BYTES]);
        Ok((Tain::unpack(packed)?, Self::PACKED_SIZE_BYTES))
    }
}
