//! Table-entry decoders.
//!
//! Only LAYER is decoded: the style resolver needs (handle, color) for
//! every layer object. Other table entries stay undecoded.

use crate::error::Result;
use crate::tables::LayerRecord;
use crate::types::Handle;

use super::{ObjectDecoder, StreamSet};

impl<'a> ObjectDecoder<'a> {
    /// Read the xref-dependence marker of a table entry.
    fn read_xref_dependent(&self, s: &mut StreamSet<'a>) -> Result<bool> {
        if self.flags().r2007_plus {
            // Bit 0x100 of the xref index word marks dependence.
            let xref_index = s.object.read_bit_short()?;
            Ok(xref_index & 0x100 != 0)
        } else {
            let _referenced = s.object.read_bit()?; // 64-flag
            let _xref_index = s.object.read_bit_short()?;
            s.object.read_bit()
        }
    }

    pub(super) fn read_layer(&self, handle: u64, s: &mut StreamSet<'a>) -> Result<LayerRecord> {
        let (object_handle, mut refs) = self.read_common_object_data(s, handle)?;

        let name = s.read_text()?;
        let _xref_dependent = self.read_xref_dependent(s)?;

        if self.flags().r13_14_only {
            let _frozen = s.object.read_bit()?;
            let _on = s.object.read_bit()?;
            let _frozen_in_new = s.object.read_bit()?;
            let _locked = s.object.read_bit()?;
        } else {
            // R2000+: one BS packs the layer state flags and plot-style id.
            let _values = s.object.read_bit_short()?;
        }

        let color = s.object.read_cm_color()?;

        // Trailing handle stream: layer control, external reference block,
        // plot style (R2000+), material (R2007+), linetype.
        refs.push(s.handle_ref()?);
        refs.push(s.handle_ref()?);
        if self.flags().r2000_plus {
            refs.push(s.handle_ref()?);
        }
        if self.flags().r2007_plus {
            refs.push(s.handle_ref()?);
        }
        refs.push(s.handle_ref()?);

        Ok(LayerRecord {
            handle: Handle::new(object_handle),
            name,
            color,
        })
    }
}
