#![allow(missing_docs)]

//! Parse binary data
//!
//! This module is the single trust boundary of the crate: every read of font data is bounds
//! checked here and a read that would run past the end of the data is reported as a
//! `ParseError` rather than being truncated.
//!
//! Two styles of access are offered. `ReadCtxt` is a cursor that reads consecutive values
//! from a `ReadScope`, which suits headers and record arrays that are walked in order.
//! `FontTable` reads values at absolute offsets from the start of a table, which suits the
//! OpenType Layout tables where every structure is addressed by an offset from its parent.

use crate::error::ParseError;
use crate::size;

#[derive(Debug, Copy, Clone)]
pub struct ReadEof {}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReadScope<'a> {
    base: usize,
    data: &'a [u8],
}

#[derive(Clone)]
pub struct ReadCtxt<'a> {
    scope: ReadScope<'a>,
    offset: usize,
}

/// Immutable view of the bytes of one font table.
///
/// All structured reads of layout data go through a `FontTable`. Offsets are relative to the
/// start of the table. Reading past the end of the table is a `ParseError::BadEof`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FontTable<'a> {
    scope: ReadScope<'a>,
}

impl<'a> ReadScope<'a> {
    pub fn new(data: &'a [u8]) -> ReadScope<'a> {
        let base = 0;
        ReadScope { base, data }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn offset(&self, offset: usize) -> ReadScope<'a> {
        let base = self.base + offset;
        let data = self.data.get(offset..).unwrap_or(&[]);
        ReadScope { base, data }
    }

    pub fn offset_length(&self, offset: usize, length: usize) -> Result<ReadScope<'a>, ParseError> {
        if offset < self.data.len() || length == 0 {
            let data = self.data.get(offset..).unwrap_or(&[]);
            if length <= data.len() {
                let base = self.base + offset;
                let data = &data[0..length];
                Ok(ReadScope { base, data })
            } else {
                Err(ParseError::BadEof)
            }
        } else {
            Err(ParseError::BadOffset)
        }
    }

    pub fn ctxt(&self) -> ReadCtxt<'a> {
        ReadCtxt::new(*self)
    }
}

impl<'a> ReadCtxt<'a> {
    /// ReadCtxt is constructed by calling `ReadScope::ctxt`.
    fn new(scope: ReadScope<'a>) -> ReadCtxt<'a> {
        ReadCtxt { scope, offset: 0 }
    }

    pub fn check(&self, cond: bool) -> Result<(), ParseError> {
        match cond {
            true => Ok(()),
            false => Err(ParseError::BadValue),
        }
    }

    /// Check a condition, returning `ParseError::BadVersion` if `false`.
    ///
    /// Intended for use in checking versions read from data. Example:
    ///
    /// ```
    /// use otlayout::binary::read::ReadScope;
    /// use otlayout::error::ParseError;
    ///
    /// let scope = ReadScope::new(&[0, 1]);
    /// let mut ctxt = scope.ctxt();
    /// let major_version = ctxt.read_u16be().expect("unable to read version");
    ///
    /// assert!(ctxt.check_version(major_version == 1).is_ok());
    /// assert_eq!(ctxt.check_version(major_version == 2), Err(ParseError::BadVersion));
    /// ```
    pub fn check_version(&self, cond: bool) -> Result<(), ParseError> {
        match cond {
            true => Ok(()),
            false => Err(ParseError::BadVersion),
        }
    }

    fn check_avail(&self, length: usize) -> Result<(), ReadEof> {
        match self.offset.checked_add(length) {
            Some(endpos) if endpos <= self.scope.data.len() => Ok(()),
            _ => Err(ReadEof {}),
        }
    }

    unsafe fn read_unchecked_u16be(&mut self) -> u16 {
        let hi = u16::from(*self.scope.data.get_unchecked(self.offset));
        let lo = u16::from(*self.scope.data.get_unchecked(self.offset + 1));
        self.offset += 2;
        (hi << 8) | lo
    }

    unsafe fn read_unchecked_i16be(&mut self) -> i16 {
        self.read_unchecked_u16be() as i16
    }

    unsafe fn read_unchecked_u32be(&mut self) -> u32 {
        let b0 = u32::from(*self.scope.data.get_unchecked(self.offset));
        let b1 = u32::from(*self.scope.data.get_unchecked(self.offset + 1));
        let b2 = u32::from(*self.scope.data.get_unchecked(self.offset + 2));
        let b3 = u32::from(*self.scope.data.get_unchecked(self.offset + 3));
        self.offset += 4;
        (b0 << 24) | (b1 << 16) | (b2 << 8) | b3
    }

    pub fn read_u16be(&mut self) -> Result<u16, ReadEof> {
        self.check_avail(size::U16)?;
        Ok(unsafe { self.read_unchecked_u16be() })
        // Safe because we have 2 bytes available.
    }

    pub fn read_i16be(&mut self) -> Result<i16, ReadEof> {
        self.check_avail(size::I16)?;
        Ok(unsafe { self.read_unchecked_i16be() })
        // Safe because we have 2 bytes available.
    }

    pub fn read_u32be(&mut self) -> Result<u32, ReadEof> {
        self.check_avail(size::U32)?;
        Ok(unsafe { self.read_unchecked_u32be() })
        // Safe because we have 4 bytes available.
    }

    pub fn read_scope(&mut self, length: usize) -> Result<ReadScope<'a>, ReadEof> {
        if let Ok(scope) = self.scope.offset_length(self.offset, length) {
            self.offset += length;
            Ok(scope)
        } else {
            Err(ReadEof {})
        }
    }

    pub fn read_slice(&mut self, length: usize) -> Result<&'a [u8], ReadEof> {
        let scope = self.read_scope(length)?;
        Ok(scope.data)
    }
}

impl<'a> FontTable<'a> {
    pub fn new(data: &'a [u8]) -> FontTable<'a> {
        FontTable {
            scope: ReadScope::new(data),
        }
    }

    pub fn len(&self) -> usize {
        self.scope.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scope.data.is_empty()
    }

    pub fn data(&self) -> &'a [u8] {
        self.scope.data
    }

    /// A cursor positioned at `offset` from the start of the table.
    pub fn ctxt_at(&self, offset: usize) -> ReadCtxt<'a> {
        self.scope.offset(offset).ctxt()
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16, ParseError> {
        Ok(self.ctxt_at(offset).read_u16be()?)
    }

    pub fn read_i16(&self, offset: usize) -> Result<i16, ParseError> {
        Ok(self.ctxt_at(offset).read_i16be()?)
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32, ParseError> {
        Ok(self.ctxt_at(offset).read_u32be()?)
    }

    /// Read a 16-bit offset stored at `offset` and resolve it against `base`.
    ///
    /// Returns `None` for a NULL (zero) offset.
    pub fn read_offset16(&self, base: usize, offset: usize) -> Result<Option<usize>, ParseError> {
        match self.read_u16(offset)? {
            0 => Ok(None),
            rel => Ok(Some(base + usize::from(rel))),
        }
    }
}
