//! Common entity/object data.
//!
//! Every record starts with a common block ahead of its type-specific
//! payload. The block is version-conditional in exactly four places:
//! material flags (R2007+), shadow flags (R2007+), visual-style bits
//! (R2010+), and the ds-binary-data bit (R2013+). All four are read here
//! and nowhere else.

use crate::entities::EntityCommon;
use crate::error::{DwgError, Result};
use crate::types::Handle;

use super::super::constants::limits;
use super::super::object_type::ObjectClass;
use super::{ObjectDecoder, StreamSet};

impl<'a> ObjectDecoder<'a> {
    /// Position the handle reader (and, for R2007, the string reader) from
    /// the in-body RL giving the size of the pre-handle data in bits.
    pub(super) fn update_handle_reader(&self, s: &mut StreamSet<'a>) -> Result<()> {
        let size_bits = s.object.read_raw_long()?;
        if size_bits < 0 {
            return Err(DwgError::MalformedRecord(
                "negative object data bit size".into(),
            ));
        }
        let end_bits = s.object_initial_pos + size_bits as u64;
        s.handles.set_position_in_bits(end_bits)?;

        if self.flags().r2007_plus && !self.flags().r2010_plus {
            s.text.set_position_by_flag(end_bits - 1)?;
            s.has_text_stream = !s.text.string_stream_absent();
        }
        Ok(())
    }

    /// Skip extended entity data groups: BS size, H application id, then
    /// `size` bytes of payload, terminated by a zero size.
    fn skip_extended_data(&self, s: &mut StreamSet<'a>) -> Result<()> {
        loop {
            let size = s.object.read_bit_short()?;
            if size <= 0 {
                return Ok(());
            }
            let _app_handle = s.object.handle_reference()?;
            s.object.advance(size as usize)?;
        }
    }

    /// Skip the proxy graphic blob when present.
    fn skip_graphic(&self, s: &mut StreamSet<'a>) -> Result<()> {
        if !s.object.read_bit()? {
            return Ok(());
        }
        let size = if self.flags().r2010_plus {
            s.object.read_bit_long_long()?
        } else {
            s.object.read_raw_long()? as i64
        };
        if size < 0 || size as usize > limits::MAX_BYTE_READ {
            return Err(DwgError::MalformedRecord(format!(
                "implausible graphic blob size {size}"
            )));
        }
        s.object.advance(size as usize)
    }

    /// Read the common entity data block.
    ///
    /// `map_handle` is the handle from the object map; it stands in when
    /// the record's own handle field decodes to zero.
    pub(super) fn read_common_entity_data(
        &self,
        s: &mut StreamSet<'a>,
        map_handle: u64,
    ) -> Result<EntityCommon> {
        let flags = *self.flags();

        // R2000-R2007: the pre-handle data size RL sits right after the
        // type code.
        if flags.r2000_plus && !flags.r2010_plus {
            self.update_handle_reader(s)?;
        }

        let mut handle = s.object.handle_reference()?;
        if handle == 0 {
            handle = map_handle;
        }
        s.current_handle = handle;

        self.skip_extended_data(s)?;
        self.skip_graphic(s)?;

        // R13-R14: the RL comes after handle and extended data.
        if flags.r13_14_only {
            self.update_handle_reader(s)?;
        }

        let mut refs: Vec<u64> = Vec::new();

        // Entity mode; mode 0 carries an owner reference.
        let entity_mode = s.object.read_2bits()?;
        if entity_mode == 0 {
            refs.push(s.handle_ref()?);
        }

        let reactor_count = s.object.read_bit_long()?;
        if !(0..=limits::MAX_REACTORS as i32).contains(&reactor_count) {
            return Err(DwgError::MalformedRecord(format!(
                "implausible reactor count {reactor_count}"
            )));
        }

        let xdict_missing = if flags.r2004_plus {
            s.object.read_bit()?
        } else {
            false
        };

        if flags.r2013_plus {
            let _has_ds_binary_data = s.object.read_bit()?;
        }

        for _ in 0..reactor_count {
            refs.push(s.handle_ref()?);
        }
        if !xdict_missing {
            refs.push(s.handle_ref()?);
        }

        let mut layer_handle = 0u64;
        let mut linetype_handle = 0u64;

        if flags.r13_14_only {
            layer_handle = s.handle_ref()?;
            refs.push(layer_handle);
            let linetype_is_by_layer = s.object.read_bit()?;
            if !linetype_is_by_layer {
                linetype_handle = s.handle_ref()?;
                refs.push(linetype_handle);
            }
        }

        // R13-R2000: previous/next entity links.
        if !flags.r2004_plus {
            let no_links = s.object.read_bit()?;
            if !no_links {
                refs.push(s.handle_ref()?);
                refs.push(s.handle_ref()?);
            }
        }

        let (color, has_color_handle) = s.object.read_en_color()?;
        if flags.r2004_plus && has_color_handle {
            refs.push(s.handle_ref()?);
        }

        let _linetype_scale = s.object.read_bit_double()?;

        if flags.r2000_plus {
            layer_handle = s.handle_ref()?;
            refs.push(layer_handle);

            // Linetype flags: 3 means an explicit handle follows.
            let linetype_flags = s.object.read_2bits()?;
            if linetype_flags == 3 {
                linetype_handle = s.handle_ref()?;
                refs.push(linetype_handle);
            }

            if flags.r2007_plus {
                let material_flags = s.object.read_2bits()?;
                if material_flags == 3 {
                    refs.push(s.handle_ref()?);
                }
                let _shadow_flags = s.object.read_raw_char()?;
            }

            let plotstyle_flags = s.object.read_2bits()?;
            if plotstyle_flags == 3 {
                refs.push(s.handle_ref()?);
            }

            if flags.r2010_plus {
                let has_full_visual_style = s.object.read_bit()?;
                let has_face_visual_style = s.object.read_bit()?;
                let has_edge_visual_style = s.object.read_bit()?;
                if has_full_visual_style {
                    refs.push(s.handle_ref()?);
                }
                if has_face_visual_style {
                    refs.push(s.handle_ref()?);
                }
                if has_edge_visual_style {
                    refs.push(s.handle_ref()?);
                }
            }
        }

        let invisibility = s.object.read_bit_short()?;
        let line_weight = if flags.r2000_plus {
            s.object.read_raw_char()?
        } else {
            0
        };

        Ok(EntityCommon {
            handle: Handle::new(handle),
            color,
            layer_handle,
            linetype_handle,
            invisible: invisibility & 1 != 0,
            line_weight,
            refs,
        })
    }

    /// Read the common non-entity data block shared by table entries and
    /// other non-graphical objects. Returns the handle and the ordered
    /// handle-stream references (owner, reactors, xdictionary).
    pub(super) fn read_common_object_data(
        &self,
        s: &mut StreamSet<'a>,
        map_handle: u64,
    ) -> Result<(u64, Vec<u64>)> {
        let flags = *self.flags();

        if flags.r2000_plus && !flags.r2010_plus {
            self.update_handle_reader(s)?;
        }

        let mut handle = s.object.handle_reference()?;
        if handle == 0 {
            handle = map_handle;
        }
        s.current_handle = handle;

        self.skip_extended_data(s)?;

        if flags.r13_14_only {
            self.update_handle_reader(s)?;
        }

        let reactor_count = s.object.read_bit_long()?;
        if !(0..=limits::MAX_REACTORS as i32).contains(&reactor_count) {
            return Err(DwgError::MalformedRecord(format!(
                "implausible reactor count {reactor_count}"
            )));
        }

        let xdict_missing = if flags.r2004_plus {
            s.object.read_bit()?
        } else {
            false
        };
        if flags.r2013_plus {
            let _has_ds_binary_data = s.object.read_bit()?;
        }

        let mut refs = Vec::with_capacity(reactor_count as usize + 2);
        refs.push(s.handle_ref()?); // owner
        for _ in 0..reactor_count {
            refs.push(s.handle_ref()?);
        }
        if !xdict_missing {
            refs.push(s.handle_ref()?);
        }

        Ok((handle, refs))
    }

    /// Common data for records without a registered decoder.
    pub(super) fn read_unknown_common(
        &self,
        s: &mut StreamSet<'a>,
        class: ObjectClass,
        map_handle: u64,
    ) -> Result<EntityCommon> {
        match class {
            ObjectClass::Entity => self.read_common_entity_data(s, map_handle),
            ObjectClass::Object => {
                let (handle, refs) = self.read_common_object_data(s, map_handle)?;
                Ok(EntityCommon {
                    handle: Handle::new(handle),
                    refs,
                    ..Default::default()
                })
            }
        }
    }
}
