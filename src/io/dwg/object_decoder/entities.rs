//! Typed entity decoders.
//!
//! One decoder per supported type, each consuming the common entity data
//! and then the type-specific bit layout. A decoder is total over its
//! declared input: any truncation or invalid tag bit surfaces as an error
//! and no partial record escapes.

use crate::entities::{
    Arc, Circle, Dimension, DimensionSubtype, Ellipse, EntityRecord, Face3D, Insert, Line,
    LwPolyline, LwPolylineFlags, MText, Point, Ray, Solid, Text, XLine,
};
use crate::error::{DwgError, Result};
use crate::types::Vector3;

use super::super::constants::limits;
use super::super::object_type::ObjectType;
use super::{ObjectDecoder, StreamSet};

impl<'a> ObjectDecoder<'a> {
    pub(super) fn read_line(&self, handle: u64, s: &mut StreamSet<'a>) -> Result<EntityRecord> {
        let common = self.read_common_entity_data(s, handle)?;

        let start;
        let end;
        if self.flags().r13_14_only {
            start = s.object.read_3bit_double()?;
            end = s.object.read_3bit_double()?;
        } else {
            // R2000+ packs the endpoints with per-axis defaults and an
            // all-z-zero bit.
            let z_is_zero = s.object.read_bit()?;
            let x1 = s.object.read_raw_double()?;
            let x2 = s.object.read_bit_double_with_default(x1)?;
            let y1 = s.object.read_raw_double()?;
            let y2 = s.object.read_bit_double_with_default(y1)?;
            let (z1, z2) = if z_is_zero {
                (0.0, 0.0)
            } else {
                let z1 = s.object.read_raw_double()?;
                let z2 = s.object.read_bit_double_with_default(z1)?;
                (z1, z2)
            };
            start = Vector3::new(x1, y1, z1);
            end = Vector3::new(x2, y2, z2);
        }

        let thickness = s.object.read_bit_thickness()?;
        let extrusion = s.object.read_bit_extrusion()?;

        Ok(EntityRecord::Line(Line {
            common,
            start,
            end,
            thickness,
            extrusion,
        }))
    }

    pub(super) fn read_arc(&self, handle: u64, s: &mut StreamSet<'a>) -> Result<EntityRecord> {
        let common = self.read_common_entity_data(s, handle)?;

        let center = s.object.read_3bit_double()?;
        let radius = s.object.read_bit_double()?;
        let thickness = s.object.read_bit_thickness()?;
        let extrusion = s.object.read_bit_extrusion()?;
        let start_angle = s.object.read_bit_double()?;
        let end_angle = s.object.read_bit_double()?;

        Ok(EntityRecord::Arc(Arc {
            common,
            center,
            radius,
            start_angle,
            end_angle,
            thickness,
            extrusion,
        }))
    }

    pub(super) fn read_circle(&self, handle: u64, s: &mut StreamSet<'a>) -> Result<EntityRecord> {
        let common = self.read_common_entity_data(s, handle)?;

        let center = s.object.read_3bit_double()?;
        let radius = s.object.read_bit_double()?;
        let thickness = s.object.read_bit_thickness()?;
        let extrusion = s.object.read_bit_extrusion()?;

        Ok(EntityRecord::Circle(Circle {
            common,
            center,
            radius,
            thickness,
            extrusion,
        }))
    }

    pub(super) fn read_point(&self, handle: u64, s: &mut StreamSet<'a>) -> Result<EntityRecord> {
        let common = self.read_common_entity_data(s, handle)?;

        let location = s.object.read_3bit_double()?;
        let thickness = s.object.read_bit_thickness()?;
        let extrusion = s.object.read_bit_extrusion()?;
        let x_axis_angle = s.object.read_bit_double()?;

        Ok(EntityRecord::Point(Point {
            common,
            location,
            thickness,
            extrusion,
            x_axis_angle,
        }))
    }

    pub(super) fn read_ellipse(&self, handle: u64, s: &mut StreamSet<'a>) -> Result<EntityRecord> {
        let common = self.read_common_entity_data(s, handle)?;

        let center = s.object.read_3bit_double()?;
        let major_axis = s.object.read_3bit_double()?;
        let extrusion = s.object.read_3bit_double()?;
        let axis_ratio = s.object.read_bit_double()?;
        let start_parameter = s.object.read_bit_double()?;
        let end_parameter = s.object.read_bit_double()?;

        Ok(EntityRecord::Ellipse(Ellipse {
            common,
            center,
            major_axis,
            extrusion,
            axis_ratio,
            start_parameter,
            end_parameter,
        }))
    }

    pub(super) fn read_lwpolyline(
        &self,
        handle: u64,
        s: &mut StreamSet<'a>,
    ) -> Result<EntityRecord> {
        let common = self.read_common_entity_data(s, handle)?;

        let flag_word = s.object.read_bit_short()? as u16;
        let flags = LwPolylineFlags::from_bits_retain(flag_word);

        let constant_width = if flags.contains(LwPolylineFlags::HAS_CONSTANT_WIDTH) {
            Some(s.object.read_bit_double()?)
        } else {
            None
        };
        let elevation = if flags.contains(LwPolylineFlags::HAS_ELEVATION) {
            s.object.read_bit_double()?
        } else {
            0.0
        };
        let thickness = if flags.contains(LwPolylineFlags::HAS_THICKNESS) {
            s.object.read_bit_double()?
        } else {
            0.0
        };
        let extrusion = if flags.contains(LwPolylineFlags::HAS_EXTRUSION) {
            s.object.read_3bit_double()?
        } else {
            Vector3::UNIT_Z
        };

        let point_count = s.object.read_bit_long()?;
        if !(0..=limits::MAX_VERTICES as i32).contains(&point_count) {
            return Err(DwgError::MalformedRecord(format!(
                "implausible vertex count {point_count}"
            )));
        }
        let bulge_count = if flags.contains(LwPolylineFlags::HAS_BULGES) {
            s.object.read_bit_long()?
        } else {
            0
        };
        let vertex_id_count = if self.flags().r2010_plus
            && flags.contains(LwPolylineFlags::HAS_VERTEX_IDS)
        {
            s.object.read_bit_long()?
        } else {
            0
        };
        let width_count = if flags.contains(LwPolylineFlags::HAS_WIDTHS) {
            s.object.read_bit_long()?
        } else {
            0
        };
        if bulge_count < 0 || vertex_id_count < 0 || width_count < 0 {
            return Err(DwgError::MalformedRecord(
                "negative LWPOLYLINE item count".into(),
            ));
        }
        // Bulges and widths are per-vertex when present.
        if (bulge_count != 0 && bulge_count != point_count)
            || (width_count != 0 && width_count != point_count)
        {
            return Err(DwgError::MalformedRecord(format!(
                "LWPOLYLINE item counts disagree: {point_count} points, \
                 {bulge_count} bulges, {width_count} widths"
            )));
        }

        let mut points = Vec::with_capacity(point_count as usize);
        for _ in 0..point_count {
            points.push(s.object.read_2raw_double()?);
        }
        let mut bulges = Vec::with_capacity(bulge_count as usize);
        for _ in 0..bulge_count {
            bulges.push(s.object.read_bit_double()?);
        }
        for _ in 0..vertex_id_count {
            let _vertex_id = s.object.read_bit_long()?;
        }
        let mut widths = Vec::with_capacity(width_count as usize);
        for _ in 0..width_count {
            let start_width = s.object.read_bit_double()?;
            let end_width = s.object.read_bit_double()?;
            widths.push((start_width, end_width));
        }

        Ok(EntityRecord::LwPolyline(LwPolyline {
            common,
            flags,
            points,
            bulges,
            widths,
            constant_width,
            elevation,
            thickness,
            extrusion,
        }))
    }

    pub(super) fn read_text_entity(
        &self,
        handle: u64,
        s: &mut StreamSet<'a>,
    ) -> Result<EntityRecord> {
        let mut common = self.read_common_entity_data(s, handle)?;

        let elevation;
        let insertion_point;
        let alignment_point;
        let extrusion;
        let thickness;
        let oblique_angle;
        let rotation;
        let height;
        let width_factor;
        let value;
        let generation;
        let horizontal_alignment;
        let vertical_alignment;

        if self.flags().r13_14_only {
            elevation = s.object.read_bit_double()?;
            let ip = s.object.read_2raw_double()?;
            insertion_point = Vector3::new(ip.x, ip.y, elevation);
            let ap = s.object.read_2raw_double()?;
            alignment_point = Some(Vector3::new(ap.x, ap.y, elevation));
            extrusion = s.object.read_bit_extrusion()?;
            thickness = s.object.read_bit_thickness()?;
            oblique_angle = s.object.read_bit_double()?;
            rotation = s.object.read_bit_double()?;
            height = s.object.read_bit_double()?;
            width_factor = s.object.read_bit_double()?;
            value = s.read_text()?;
            generation = s.object.read_bit_short()?;
            horizontal_alignment = s.object.read_bit_short()?;
            vertical_alignment = s.object.read_bit_short()?;
        } else {
            // R2000+: a data-flag byte marks which fields are elided.
            let data_flags = s.object.read_raw_char()?;
            elevation = if data_flags & 0x01 == 0 {
                s.object.read_raw_double()?
            } else {
                0.0
            };
            let ip = s.object.read_2raw_double()?;
            insertion_point = Vector3::new(ip.x, ip.y, elevation);
            alignment_point = if data_flags & 0x02 == 0 {
                let ap = s.object.read_2raw_double()?;
                Some(Vector3::new(ap.x, ap.y, elevation))
            } else {
                None
            };
            extrusion = s.object.read_bit_extrusion()?;
            thickness = s.object.read_bit_thickness()?;
            oblique_angle = if data_flags & 0x04 == 0 {
                s.object.read_raw_double()?
            } else {
                0.0
            };
            rotation = if data_flags & 0x08 == 0 {
                s.object.read_raw_double()?
            } else {
                0.0
            };
            height = s.object.read_raw_double()?;
            width_factor = if data_flags & 0x10 == 0 {
                s.object.read_raw_double()?
            } else {
                1.0
            };
            value = s.read_text()?;
            generation = if data_flags & 0x20 == 0 {
                s.object.read_bit_short()?
            } else {
                0
            };
            horizontal_alignment = if data_flags & 0x40 == 0 {
                s.object.read_bit_short()?
            } else {
                0
            };
            vertical_alignment = if data_flags & 0x80 == 0 {
                s.object.read_bit_short()?
            } else {
                0
            };
        }

        let style_handle = s.handle_ref()?;
        common.refs.push(style_handle);

        Ok(EntityRecord::Text(Text {
            common,
            value,
            insertion_point,
            alignment_point,
            height,
            rotation,
            width_factor,
            oblique_angle,
            thickness,
            extrusion,
            generation,
            horizontal_alignment,
            vertical_alignment,
            style_handle,
        }))
    }

    pub(super) fn read_mtext(&self, handle: u64, s: &mut StreamSet<'a>) -> Result<EntityRecord> {
        let mut common = self.read_common_entity_data(s, handle)?;

        let insertion_point = s.object.read_3bit_double()?;
        let extrusion = s.object.read_3bit_double()?;
        let x_axis_direction = s.object.read_3bit_double()?;
        let rect_width = s.object.read_bit_double()?;
        let rect_height = if self.flags().r2007_plus {
            Some(s.object.read_bit_double()?)
        } else {
            None
        };
        let text_height = s.object.read_bit_double()?;
        let attachment = s.object.read_bit_short()?;
        let drawing_direction = s.object.read_bit_short()?;
        let extents_height = s.object.read_bit_double()?;
        let extents_width = s.object.read_bit_double()?;
        let value = s.read_text()?;

        let (line_spacing_style, line_spacing_factor) = if self.flags().r2000_plus {
            (s.object.read_bit_short()?, s.object.read_bit_double()?)
        } else {
            (1, 1.0)
        };

        if self.flags().r2004_plus {
            // Background fill block; only the flag word is retained.
            let background_flags = s.object.read_bit_long()?;
            if background_flags & 1 != 0 {
                let _scale = s.object.read_bit_double()?;
                let _color = s.object.read_cm_color()?;
                let _transparency = s.object.read_bit_long()?;
            }
        }

        let style_handle = s.handle_ref()?;
        common.refs.push(style_handle);

        Ok(EntityRecord::MText(MText {
            common,
            value,
            insertion_point,
            extrusion,
            x_axis_direction,
            rect_width,
            rect_height,
            text_height,
            attachment,
            drawing_direction,
            extents_height,
            extents_width,
            line_spacing_style,
            line_spacing_factor,
            style_handle,
        }))
    }

    pub(super) fn read_insert(
        &self,
        handle: u64,
        s: &mut StreamSet<'a>,
        is_minsert: bool,
    ) -> Result<EntityRecord> {
        let mut common = self.read_common_entity_data(s, handle)?;

        let insertion_point = s.object.read_3bit_double()?;

        let x_scale;
        let y_scale;
        let z_scale;
        if self.flags().r2000_plus {
            let data_flags = s.object.read_2bits()?;
            x_scale = if data_flags & 1 == 0 {
                s.object.read_raw_double()?
            } else {
                1.0
            };
            y_scale = if data_flags & 2 == 0 {
                s.object.read_bit_double_with_default(x_scale)?
            } else {
                x_scale
            };
            z_scale = s.object.read_bit_double_with_default(x_scale)?;
        } else {
            x_scale = s.object.read_bit_double()?;
            y_scale = s.object.read_bit_double()?;
            z_scale = s.object.read_bit_double()?;
        }

        let rotation = s.object.read_bit_double()?;
        let extrusion = s.object.read_bit_extrusion()?;

        let has_attributes = s.object.read_bit()?;
        let owned_count = if self.flags().r2004_plus && has_attributes {
            s.object.read_bit_long()?
        } else {
            0
        };
        if !(0..=limits::MAX_REACTORS as i32).contains(&owned_count) {
            return Err(DwgError::MalformedRecord(format!(
                "implausible attribute count {owned_count}"
            )));
        }

        if is_minsert {
            let _column_count = s.object.read_bit_short()?;
            let _row_count = s.object.read_bit_short()?;
            let _column_spacing = s.object.read_bit_double()?;
            let _row_spacing = s.object.read_bit_double()?;
        }

        let block_handle = s.handle_ref()?;
        common.refs.push(block_handle);

        if has_attributes {
            if self.flags().r2004_plus {
                for _ in 0..owned_count {
                    let owned = s.handle_ref()?;
                    common.refs.push(owned);
                }
            } else {
                let first = s.handle_ref()?;
                let last = s.handle_ref()?;
                common.refs.push(first);
                common.refs.push(last);
            }
            let seqend = s.handle_ref()?;
            common.refs.push(seqend);
        }

        Ok(EntityRecord::Insert(Insert {
            common,
            insertion_point,
            x_scale,
            y_scale,
            z_scale,
            rotation,
            extrusion,
            block_handle,
            block_name: None,
        }))
    }

    pub(super) fn read_ray(&self, handle: u64, s: &mut StreamSet<'a>) -> Result<EntityRecord> {
        let common = self.read_common_entity_data(s, handle)?;
        let base_point = s.object.read_3bit_double()?;
        let direction = s.object.read_3bit_double()?;
        Ok(EntityRecord::Ray(Ray {
            common,
            base_point,
            direction,
        }))
    }

    pub(super) fn read_xline(&self, handle: u64, s: &mut StreamSet<'a>) -> Result<EntityRecord> {
        let common = self.read_common_entity_data(s, handle)?;
        let base_point = s.object.read_3bit_double()?;
        let direction = s.object.read_3bit_double()?;
        Ok(EntityRecord::XLine(XLine {
            common,
            base_point,
            direction,
        }))
    }

    /// SOLID and TRACE share one schema; `is_trace` only picks the variant.
    pub(super) fn read_solid(
        &self,
        handle: u64,
        s: &mut StreamSet<'a>,
        is_trace: bool,
    ) -> Result<EntityRecord> {
        let common = self.read_common_entity_data(s, handle)?;

        let thickness = s.object.read_bit_thickness()?;
        let elevation = s.object.read_bit_double()?;
        let c1 = s.object.read_2raw_double()?;
        let c2 = s.object.read_2raw_double()?;
        let c3 = s.object.read_2raw_double()?;
        let c4 = s.object.read_2raw_double()?;
        let extrusion = s.object.read_bit_extrusion()?;

        let solid = Solid {
            common,
            first_corner: Vector3::new(c1.x, c1.y, elevation),
            second_corner: Vector3::new(c2.x, c2.y, elevation),
            third_corner: Vector3::new(c3.x, c3.y, elevation),
            fourth_corner: Vector3::new(c4.x, c4.y, elevation),
            thickness,
            extrusion,
        };

        Ok(if is_trace {
            EntityRecord::Trace(solid)
        } else {
            EntityRecord::Solid(solid)
        })
    }

    pub(super) fn read_3dface(&self, handle: u64, s: &mut StreamSet<'a>) -> Result<EntityRecord> {
        let common = self.read_common_entity_data(s, handle)?;

        let first_corner;
        let second_corner;
        let third_corner;
        let fourth_corner;
        let invisible_edges;

        if self.flags().r2000_plus {
            let has_no_flags = s.object.read_bit()?;
            let z_is_zero = s.object.read_bit()?;

            let x1 = s.object.read_raw_double()?;
            let y1 = s.object.read_raw_double()?;
            let z1 = if z_is_zero {
                0.0
            } else {
                s.object.read_raw_double()?
            };
            first_corner = Vector3::new(x1, y1, z1);

            // Later corners default component-wise to the previous one.
            second_corner = Vector3::new(
                s.object.read_bit_double_with_default(first_corner.x)?,
                s.object.read_bit_double_with_default(first_corner.y)?,
                s.object.read_bit_double_with_default(first_corner.z)?,
            );
            third_corner = Vector3::new(
                s.object.read_bit_double_with_default(second_corner.x)?,
                s.object.read_bit_double_with_default(second_corner.y)?,
                s.object.read_bit_double_with_default(second_corner.z)?,
            );
            fourth_corner = Vector3::new(
                s.object.read_bit_double_with_default(third_corner.x)?,
                s.object.read_bit_double_with_default(third_corner.y)?,
                s.object.read_bit_double_with_default(third_corner.z)?,
            );

            invisible_edges = if has_no_flags {
                0
            } else {
                s.object.read_bit_short()? as u16
            };
        } else {
            first_corner = s.object.read_3bit_double()?;
            second_corner = s.object.read_3bit_double()?;
            third_corner = s.object.read_3bit_double()?;
            fourth_corner = s.object.read_3bit_double()?;
            invisible_edges = s.object.read_bit_short()? as u16;
        }

        Ok(EntityRecord::Face3D(Face3D {
            common,
            first_corner,
            second_corner,
            third_corner,
            fourth_corner,
            invisible_edges,
        }))
    }

    pub(super) fn read_dimension(
        &self,
        handle: u64,
        object_type: ObjectType,
        s: &mut StreamSet<'a>,
    ) -> Result<EntityRecord> {
        let mut common = self.read_common_entity_data(s, handle)?;

        if self.flags().r2010_plus {
            let _class_version = s.object.read_raw_char()?;
        }

        let extrusion = s.object.read_bit_extrusion()?;
        let midpoint = s.object.read_2raw_double()?;
        let elevation = s.object.read_bit_double()?;
        let text_midpoint = Vector3::new(midpoint.x, midpoint.y, elevation);
        let flags = if self.flags().r2000_plus {
            s.object.read_raw_char()?
        } else {
            0
        };
        let user_text = {
            let text = s.read_text()?;
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        };
        let text_rotation = s.object.read_bit_double()?;
        let horizontal_direction = s.object.read_bit_double()?;
        let insert_scale = s.object.read_3bit_double()?;
        let insert_rotation = s.object.read_bit_double()?;

        let (attachment, line_spacing_style, line_spacing_factor, actual_measurement) =
            if self.flags().r2000_plus {
                (
                    s.object.read_bit_short()?,
                    s.object.read_bit_short()?,
                    s.object.read_bit_double()?,
                    s.object.read_bit_double()?,
                )
            } else {
                (5, 1, 1.0, 0.0)
            };

        if self.flags().r2007_plus {
            let _unknown = s.object.read_bit()?;
            let _has_style_override = s.object.read_bit()?;
        }

        // Common insertion point (group 12); z carries the elevation, as
        // for the text midpoint. Distinct from each subtype's group-10
        // definition point read below.
        let insertion = s.object.read_2raw_double()?;
        let insertion_point = Vector3::new(insertion.x, insertion.y, elevation);

        let subtype = match object_type {
            ObjectType::DimOrdinate => DimensionSubtype::Ordinate,
            ObjectType::DimLinear => DimensionSubtype::Linear,
            ObjectType::DimAligned => DimensionSubtype::Aligned,
            ObjectType::DimAng3Pt => DimensionSubtype::Angular3Pt,
            ObjectType::DimAng2Ln => DimensionSubtype::Angular2Ln,
            ObjectType::DimRadius => DimensionSubtype::Radius,
            ObjectType::DimDiameter => DimensionSubtype::Diameter,
            other => {
                return Err(DwgError::MalformedRecord(format!(
                    "{other:?} is not a dimension subtype"
                )));
            }
        };

        let mut dim = Dimension {
            common: std::mem::take(&mut common),
            subtype,
            extrusion,
            text_midpoint,
            insertion_point,
            flags,
            user_text,
            text_rotation,
            horizontal_direction,
            insert_scale,
            insert_rotation,
            actual_measurement,
            attachment,
            line_spacing_style,
            line_spacing_factor,
            definition_point: Vector3::ZERO,
            defpoint2: None,
            defpoint3: None,
            defpoint4: None,
            arc_point: None,
            rotation: None,
            ext_line_rotation: None,
            leader_length: None,
            ordinate_type_x: None,
            dimstyle_handle: 0,
            block_handle: 0,
        };

        match subtype {
            DimensionSubtype::Ordinate => {
                dim.definition_point = s.object.read_3bit_double()?;
                dim.defpoint2 = Some(s.object.read_3bit_double()?);
                dim.defpoint3 = Some(s.object.read_3bit_double()?);
                let ordinate_flags = s.object.read_raw_char()?;
                dim.ordinate_type_x = Some(ordinate_flags & 1 != 0);
            }
            DimensionSubtype::Linear => {
                dim.defpoint2 = Some(s.object.read_3bit_double()?);
                dim.defpoint3 = Some(s.object.read_3bit_double()?);
                dim.definition_point = s.object.read_3bit_double()?;
                dim.rotation = Some(s.object.read_bit_double()?);
                dim.ext_line_rotation = Some(s.object.read_bit_double()?);
            }
            DimensionSubtype::Aligned => {
                dim.defpoint2 = Some(s.object.read_3bit_double()?);
                dim.defpoint3 = Some(s.object.read_3bit_double()?);
                dim.definition_point = s.object.read_3bit_double()?;
                dim.ext_line_rotation = Some(s.object.read_bit_double()?);
            }
            DimensionSubtype::Angular3Pt => {
                dim.definition_point = s.object.read_3bit_double()?;
                dim.defpoint2 = Some(s.object.read_3bit_double()?);
                dim.defpoint3 = Some(s.object.read_3bit_double()?);
                dim.defpoint4 = Some(s.object.read_3bit_double()?);
            }
            DimensionSubtype::Angular2Ln => {
                dim.arc_point = Some(s.object.read_3bit_double()?);
                dim.defpoint2 = Some(s.object.read_3bit_double()?);
                dim.defpoint3 = Some(s.object.read_3bit_double()?);
                dim.defpoint4 = Some(s.object.read_3bit_double()?);
                dim.definition_point = s.object.read_3bit_double()?;
            }
            DimensionSubtype::Radius | DimensionSubtype::Diameter => {
                dim.definition_point = s.object.read_3bit_double()?;
                dim.defpoint4 = Some(s.object.read_3bit_double()?);
                dim.leader_length = Some(s.object.read_bit_double()?);
            }
        }

        dim.dimstyle_handle = s.handle_ref()?;
        dim.block_handle = s.handle_ref()?;
        dim.common.refs.push(dim.dimstyle_handle);
        dim.common.refs.push(dim.block_handle);

        Ok(EntityRecord::Dimension(dim))
    }
}
