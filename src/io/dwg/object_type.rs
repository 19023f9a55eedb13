//! Fixed DWG object type codes.
//!
//! Codes below 500 are fixed by the format; codes at or above 500 belong to
//! classes registered in the file's own `AcDb:Classes` table and are
//! resolved through [`crate::classes::ClassTable`].

/// Whether a type produces a graphical entity or a non-graphical object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectClass {
    Entity,
    Object,
}

/// Type codes with a fixed meaning in the DWG format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Text,
    Attrib,
    Attdef,
    Block,
    Endblk,
    Seqend,
    Insert,
    Minsert,
    Vertex2D,
    Vertex3D,
    VertexMesh,
    VertexPface,
    VertexPfaceFace,
    Polyline2D,
    Polyline3D,
    Arc,
    Circle,
    Line,
    DimOrdinate,
    DimLinear,
    DimAligned,
    DimAng3Pt,
    DimAng2Ln,
    DimRadius,
    DimDiameter,
    Point,
    Face3D,
    PolylinePface,
    PolylineMesh,
    Solid,
    Trace,
    Shape,
    Viewport,
    Ellipse,
    Spline,
    Region,
    Solid3D,
    Body,
    Ray,
    Xline,
    Dictionary,
    OleFrame,
    MText,
    Leader,
    Tolerance,
    Mline,
    BlockControl,
    BlockHeader,
    LayerControl,
    Layer,
    StyleControl,
    Style,
    LtypeControl,
    Ltype,
    ViewControl,
    View,
    UcsControl,
    Ucs,
    VportControl,
    Vport,
    AppidControl,
    Appid,
    DimstyleControl,
    Dimstyle,
    VpEntHdrControl,
    VpEntHdr,
    Group,
    MlineStyle,
    Ole2Frame,
    LongTransaction,
    LwPolyline,
    Hatch,
    XRecord,
    Placeholder,
    VbaProject,
    Layout,
    ProxyEntity,
    ProxyObject,
    /// Code without a fixed meaning; resolved through the class table.
    Unlisted,
}

/// Codes at or above this value are class-table resolved.
pub const CLASS_CODE_FENCE: u16 = 500;

impl ObjectType {
    /// Map a raw type code to its fixed meaning.
    pub fn from_raw(code: u16) -> Self {
        use ObjectType::*;
        match code {
            0x01 => Text,
            0x02 => Attrib,
            0x03 => Attdef,
            0x04 => Block,
            0x05 => Endblk,
            0x06 => Seqend,
            0x07 => Insert,
            0x08 => Minsert,
            0x0A => Vertex2D,
            0x0B => Vertex3D,
            0x0C => VertexMesh,
            0x0D => VertexPface,
            0x0E => VertexPfaceFace,
            0x0F => Polyline2D,
            0x10 => Polyline3D,
            0x11 => Arc,
            0x12 => Circle,
            0x13 => Line,
            0x14 => DimOrdinate,
            0x15 => DimLinear,
            0x16 => DimAligned,
            0x17 => DimAng3Pt,
            0x18 => DimAng2Ln,
            0x19 => DimRadius,
            0x1A => DimDiameter,
            0x1B => Point,
            0x1C => Face3D,
            0x1D => PolylinePface,
            0x1E => PolylineMesh,
            0x1F => Solid,
            0x20 => Trace,
            0x21 => Shape,
            0x22 => Viewport,
            0x23 => Ellipse,
            0x24 => Spline,
            0x25 => Region,
            0x26 => Solid3D,
            0x27 => Body,
            0x28 => Ray,
            0x29 => Xline,
            0x2A => Dictionary,
            0x2B => OleFrame,
            0x2C => MText,
            0x2D => Leader,
            0x2E => Tolerance,
            0x2F => Mline,
            0x30 => BlockControl,
            0x31 => BlockHeader,
            0x32 => LayerControl,
            0x33 => Layer,
            0x34 => StyleControl,
            0x35 => Style,
            0x38 => LtypeControl,
            0x39 => Ltype,
            0x3C => ViewControl,
            0x3D => View,
            0x3E => UcsControl,
            0x3F => Ucs,
            0x40 => VportControl,
            0x41 => Vport,
            0x42 => AppidControl,
            0x43 => Appid,
            0x44 => DimstyleControl,
            0x45 => Dimstyle,
            0x46 => VpEntHdrControl,
            0x47 => VpEntHdr,
            0x48 => Group,
            0x49 => MlineStyle,
            0x4A => Ole2Frame,
            0x4C => LongTransaction,
            0x4D => LwPolyline,
            0x4E => Hatch,
            0x4F => XRecord,
            0x50 => Placeholder,
            0x51 => VbaProject,
            0x52 => Layout,
            0x1F2 => ProxyEntity,
            0x1F3 => ProxyObject,
            _ => Unlisted,
        }
    }

    /// The symbolic type name used in queries and object headers.
    pub fn type_name(&self) -> &'static str {
        use ObjectType::*;
        match self {
            Text => "TEXT",
            Attrib => "ATTRIB",
            Attdef => "ATTDEF",
            Block => "BLOCK",
            Endblk => "ENDBLK",
            Seqend => "SEQEND",
            Insert => "INSERT",
            Minsert => "MINSERT",
            Vertex2D => "VERTEX_2D",
            Vertex3D => "VERTEX_3D",
            VertexMesh => "VERTEX_MESH",
            VertexPface => "VERTEX_PFACE",
            VertexPfaceFace => "VERTEX_PFACE_FACE",
            Polyline2D => "POLYLINE_2D",
            Polyline3D => "POLYLINE_3D",
            Arc => "ARC",
            Circle => "CIRCLE",
            Line => "LINE",
            DimOrdinate => "DIM_ORDINATE",
            DimLinear => "DIM_LINEAR",
            DimAligned => "DIM_ALIGNED",
            DimAng3Pt => "DIM_ANG3PT",
            DimAng2Ln => "DIM_ANG2LN",
            DimRadius => "DIM_RADIUS",
            DimDiameter => "DIM_DIAMETER",
            Point => "POINT",
            Face3D => "3DFACE",
            PolylinePface => "POLYLINE_PFACE",
            PolylineMesh => "POLYLINE_MESH",
            Solid => "SOLID",
            Trace => "TRACE",
            Shape => "SHAPE",
            Viewport => "VIEWPORT",
            Ellipse => "ELLIPSE",
            Spline => "SPLINE",
            Region => "REGION",
            Solid3D => "3DSOLID",
            Body => "BODY",
            Ray => "RAY",
            Xline => "XLINE",
            Dictionary => "DICTIONARY",
            OleFrame => "OLEFRAME",
            MText => "MTEXT",
            Leader => "LEADER",
            Tolerance => "TOLERANCE",
            Mline => "MLINE",
            BlockControl => "BLOCK_CONTROL",
            BlockHeader => "BLOCK_HEADER",
            LayerControl => "LAYER_CONTROL",
            Layer => "LAYER",
            StyleControl => "STYLE_CONTROL",
            Style => "STYLE",
            LtypeControl => "LTYPE_CONTROL",
            Ltype => "LTYPE",
            ViewControl => "VIEW_CONTROL",
            View => "VIEW",
            UcsControl => "UCS_CONTROL",
            Ucs => "UCS",
            VportControl => "VPORT_CONTROL",
            Vport => "VPORT",
            AppidControl => "APPID_CONTROL",
            Appid => "APPID",
            DimstyleControl => "DIMSTYLE_CONTROL",
            Dimstyle => "DIMSTYLE",
            VpEntHdrControl => "VP_ENT_HDR_CONTROL",
            VpEntHdr => "VP_ENT_HDR",
            Group => "GROUP",
            MlineStyle => "MLINESTYLE",
            Ole2Frame => "OLE2FRAME",
            LongTransaction => "LONG_TRANSACTION",
            LwPolyline => "LWPOLYLINE",
            Hatch => "HATCH",
            XRecord => "XRECORD",
            Placeholder => "ACDBPLACEHOLDER",
            VbaProject => "VBA_PROJECT",
            Layout => "LAYOUT",
            ProxyEntity => "ACAD_PROXY_ENTITY",
            ProxyObject => "ACAD_PROXY_OBJECT",
            Unlisted => "UNLISTED",
        }
    }

    /// Entity/object classification for fixed codes.
    pub fn object_class(&self) -> ObjectClass {
        use ObjectType::*;
        match self {
            Text | Attrib | Attdef | Block | Endblk | Seqend | Insert | Minsert | Vertex2D
            | Vertex3D | VertexMesh | VertexPface | VertexPfaceFace | Polyline2D | Polyline3D
            | Arc | Circle | Line | DimOrdinate | DimLinear | DimAligned | DimAng3Pt
            | DimAng2Ln | DimRadius | DimDiameter | Point | Face3D | PolylinePface
            | PolylineMesh | Solid | Trace | Shape | Viewport | Ellipse | Spline | Region
            | Solid3D | Body | Ray | Xline | OleFrame | MText | Leader | Tolerance | Mline
            | Ole2Frame | LwPolyline | Hatch | ProxyEntity => ObjectClass::Entity,
            _ => ObjectClass::Object,
        }
    }

    /// Whether this is one of the seven DIMENSION subtype codes.
    pub fn is_dimension(&self) -> bool {
        use ObjectType::*;
        matches!(
            self,
            DimOrdinate | DimLinear | DimAligned | DimAng3Pt | DimAng2Ln | DimRadius | DimDiameter
        )
    }
}
