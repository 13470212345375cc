pub mod writer {
    //! Synthesise big-endian layout table data for tests.
    //!
    #![allow(dead_code)]

    // The writer module is derived from ttf-parser, licenced under Apache-2.0.
    // https://github.com/RazrFalcon/ttf-parser/blob/439aaaebd50eb8aed66302e3c1b51fae047f85b2/src/writer.rs

    const DFLT: u32 = 0x44464C54;

    #[allow(missing_debug_implementations)]
    #[derive(Clone, Copy)]
    pub enum TtfType {
        TrueTypeMagic,
        Int8(i8),
        UInt8(u8),
        Int16(i16),
        UInt16(u16),
        Int32(i32),
        UInt32(u32),
    }

    pub fn convert(values: &[TtfType]) -> Vec<u8> {
        let mut data = Vec::with_capacity(256);
        for v in values {
            convert_type(*v, &mut data);
        }

        data
    }

    pub fn convert_type(value: TtfType, data: &mut Vec<u8>) {
        match value {
            TtfType::TrueTypeMagic => {
                data.extend_from_slice(&[0x00, 0x01, 0x00, 0x00]);
            }
            TtfType::Int8(n) => {
                data.extend_from_slice(&i8::to_be_bytes(n));
            }
            TtfType::UInt8(n) => {
                data.extend_from_slice(&u8::to_be_bytes(n));
            }
            TtfType::Int16(n) => {
                data.extend_from_slice(&i16::to_be_bytes(n));
            }
            TtfType::UInt16(n) => {
                data.extend_from_slice(&u16::to_be_bytes(n));
            }
            TtfType::Int32(n) => {
                data.extend_from_slice(&i32::to_be_bytes(n));
            }
            TtfType::UInt32(n) => {
                data.extend_from_slice(&u32::to_be_bytes(n));
            }
        }
    }

    #[derive(Debug)]
    pub struct Writer {
        pub data: Vec<u8>,
    }

    impl Writer {
        pub fn new() -> Self {
            Writer {
                data: Vec::with_capacity(256),
            }
        }

        pub fn offset(&self) -> usize {
            self.data.len()
        }

        pub fn write(&mut self, value: TtfType) {
            convert_type(value, &mut self.data);
        }

        pub fn write_all(&mut self, values: &[TtfType]) {
            for value in values {
                self.write(*value);
            }
        }

        pub fn write_bytes(&mut self, bytes: &[u8]) {
            self.data.extend_from_slice(bytes);
        }

        /// Write a zero 16-bit offset to be filled in by `patch_offset`.
        pub fn placeholder(&mut self) -> usize {
            let position = self.offset();
            self.write(TtfType::UInt16(0));
            position
        }

        /// Point the placeholder at the current end of the data, relative to `base`.
        pub fn patch_offset(&mut self, placeholder: usize, base: usize) {
            let value = u16::try_from(self.offset() - base).expect("offset too large");
            self.data[placeholder..placeholder + 2].copy_from_slice(&value.to_be_bytes());
        }

        /// Point the placeholder at `bytes`, appended to the end of the data.
        pub fn append_at(&mut self, placeholder: usize, base: usize, bytes: &[u8]) {
            self.patch_offset(placeholder, base);
            self.write_bytes(bytes);
        }

        pub fn into_inner(self) -> Vec<u8> {
            self.data
        }
    }

    pub fn coverage_format1(glyphs: &[u16]) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_all(&[TtfType::UInt16(1), TtfType::UInt16(glyphs.len() as u16)]);
        for glyph in glyphs {
            w.write(TtfType::UInt16(*glyph));
        }
        w.into_inner()
    }

    /// `(start_glyph, end_glyph, start_coverage_index)` ranges.
    pub fn coverage_format2(ranges: &[(u16, u16, u16)]) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_all(&[TtfType::UInt16(2), TtfType::UInt16(ranges.len() as u16)]);
        for (start, end, index) in ranges {
            w.write_all(&[
                TtfType::UInt16(*start),
                TtfType::UInt16(*end),
                TtfType::UInt16(*index),
            ]);
        }
        w.into_inner()
    }

    pub fn class_def_format1(start_glyph: u16, classes: &[u16]) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_all(&[
            TtfType::UInt16(1),
            TtfType::UInt16(start_glyph),
            TtfType::UInt16(classes.len() as u16),
        ]);
        for class in classes {
            w.write(TtfType::UInt16(*class));
        }
        w.into_inner()
    }

    /// `(start_glyph, end_glyph, class)` ranges.
    pub fn class_def_format2(ranges: &[(u16, u16, u16)]) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_all(&[TtfType::UInt16(2), TtfType::UInt16(ranges.len() as u16)]);
        for (start, end, class) in ranges {
            w.write_all(&[
                TtfType::UInt16(*start),
                TtfType::UInt16(*end),
                TtfType::UInt16(*class),
            ]);
        }
        w.into_inner()
    }

    /// A lookup table with its subtables stored directly after the header.
    pub fn lookup(lookup_type: u16, lookup_flag: u16, subtables: &[Vec<u8>]) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_all(&[
            TtfType::UInt16(lookup_type),
            TtfType::UInt16(lookup_flag),
            TtfType::UInt16(subtables.len() as u16),
        ]);
        let placeholders = subtables.iter().map(|_| w.placeholder()).collect::<Vec<_>>();
        for (placeholder, subtable) in placeholders.into_iter().zip(subtables) {
            w.append_at(placeholder, 0, subtable);
        }
        w.into_inner()
    }

    pub struct LangSysDef {
        /// `DFLT` makes this the default language system of the script.
        pub tag: u32,
        pub required_feature: Option<u16>,
        pub features: Vec<u16>,
    }

    pub struct ScriptDef {
        pub tag: u32,
        pub langsys: Vec<LangSysDef>,
    }

    /// A `GSUB`/`GPOS` table with one script whose default language system enables every
    /// feature.
    pub fn layout_table(
        script_tag: u32,
        required_feature: Option<u16>,
        features: &[(u32, Vec<u16>)],
        lookups: &[Vec<u8>],
    ) -> Vec<u8> {
        let script = ScriptDef {
            tag: script_tag,
            langsys: vec![LangSysDef {
                tag: DFLT,
                required_feature,
                features: (0..features.len() as u16)
                    .filter(|index| Some(*index) != required_feature)
                    .collect(),
            }],
        };
        layout_table_full(&[script], features, lookups)
    }

    pub fn layout_table_full(
        scripts: &[ScriptDef],
        features: &[(u32, Vec<u16>)],
        lookups: &[Vec<u8>],
    ) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_all(&[TtfType::UInt16(1), TtfType::UInt16(0)]);
        let script_list = w.placeholder();
        let feature_list = w.placeholder();
        let lookup_list = w.placeholder();

        // ScriptList
        w.patch_offset(script_list, 0);
        let script_list_start = w.offset();
        w.write(TtfType::UInt16(scripts.len() as u16));
        let script_placeholders = scripts
            .iter()
            .map(|script| {
                w.write(TtfType::UInt32(script.tag));
                w.placeholder()
            })
            .collect::<Vec<_>>();
        for (script, placeholder) in scripts.iter().zip(script_placeholders) {
            w.patch_offset(placeholder, script_list_start);
            let script_start = w.offset();
            let default_placeholder = w.placeholder();
            let others = script
                .langsys
                .iter()
                .filter(|langsys| langsys.tag != DFLT)
                .collect::<Vec<_>>();
            w.write(TtfType::UInt16(others.len() as u16));
            let other_placeholders = others
                .iter()
                .map(|langsys| {
                    w.write(TtfType::UInt32(langsys.tag));
                    w.placeholder()
                })
                .collect::<Vec<_>>();
            if let Some(default) = script.langsys.iter().find(|langsys| langsys.tag == DFLT) {
                w.patch_offset(default_placeholder, script_start);
                write_langsys(&mut w, default);
            }
            for (langsys, placeholder) in others.into_iter().zip(other_placeholders) {
                w.patch_offset(placeholder, script_start);
                write_langsys(&mut w, langsys);
            }
        }

        // FeatureList
        w.patch_offset(feature_list, 0);
        let feature_list_start = w.offset();
        w.write(TtfType::UInt16(features.len() as u16));
        let feature_placeholders = features
            .iter()
            .map(|(tag, _)| {
                w.write(TtfType::UInt32(*tag));
                w.placeholder()
            })
            .collect::<Vec<_>>();
        for ((_, lookup_indices), placeholder) in features.iter().zip(feature_placeholders) {
            w.patch_offset(placeholder, feature_list_start);
            w.write_all(&[
                TtfType::UInt16(0),
                TtfType::UInt16(lookup_indices.len() as u16),
            ]);
            for index in lookup_indices {
                w.write(TtfType::UInt16(*index));
            }
        }

        // LookupList
        w.patch_offset(lookup_list, 0);
        let lookup_list_start = w.offset();
        w.write(TtfType::UInt16(lookups.len() as u16));
        let lookup_placeholders = lookups.iter().map(|_| w.placeholder()).collect::<Vec<_>>();
        for (lookup, placeholder) in lookups.iter().zip(lookup_placeholders) {
            w.append_at(placeholder, lookup_list_start, lookup);
        }

        w.into_inner()
    }

    fn write_langsys(w: &mut Writer, langsys: &LangSysDef) {
        w.write_all(&[
            TtfType::UInt16(0),
            TtfType::UInt16(langsys.required_feature.unwrap_or(0xFFFF)),
            TtfType::UInt16(langsys.features.len() as u16),
        ]);
        for index in &langsys.features {
            w.write(TtfType::UInt16(*index));
        }
    }

    /// A version 1.0 `GDEF` table.
    pub fn gdef_table(glyph_class_def: Option<Vec<u8>>, mark_attach_class_def: Option<Vec<u8>>) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_all(&[TtfType::UInt16(1), TtfType::UInt16(0)]);
        let glyph_class = w.placeholder();
        w.write_all(&[TtfType::UInt16(0), TtfType::UInt16(0)]);
        let mark_attach = w.placeholder();
        if let Some(class_def) = glyph_class_def {
            w.append_at(glyph_class, 0, &class_def);
        }
        if let Some(class_def) = mark_attach_class_def {
            w.append_at(mark_attach, 0, &class_def);
        }
        w.into_inner()
    }

    /// A TrueType font file holding only `tables`.
    pub fn sfnt(tables: &[(u32, Vec<u8>)]) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_all(&[
            TtfType::TrueTypeMagic,
            TtfType::UInt16(tables.len() as u16),
            TtfType::UInt16(0),
            TtfType::UInt16(0),
            TtfType::UInt16(0),
        ]);
        let mut offset = 12 + tables.len() * 16;
        for (tag, data) in tables {
            w.write_all(&[
                TtfType::UInt32(*tag),
                TtfType::UInt32(0),
                TtfType::UInt32(offset as u32),
                TtfType::UInt32(data.len() as u32),
            ]);
            offset += data.len();
        }
        for (_, data) in tables {
            w.write_bytes(data);
        }
        w.into_inner()
    }
}
