use bitflags::bitflags;

bitflags! {
    /// Advertising data flags (\[CSS\] Part A, Section 1.3).
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    #[repr(transparent)]
    pub struct AdvFlag: u8 {
        /// LE Limited Discoverable Mode.
        const LE_LIMITED = 1 << 0;
        /// LE General Discoverable Mode.
        const LE_GENERAL = 1 << 1;
        /// BR/EDR Not Supported.
        const NO_BREDR = 1 << 2;
    }
}

/// Length-type-value data types used in advertising data
/// ([Assigned Numbers] Section 2.3).
#[derive(Clone, Copy, Debug, Eq, PartialEq, num_enum::IntoPrimitive)]
#[non_exhaustive]
#[repr(u8)]
pub enum ResponseDataType {
    Flags = 0x01,
    ShortLocalName = 0x08,
    CompleteLocalName = 0x09,
    ManufacturerData = 0xFF,
}

/// Legacy advertising PDU type ([Vol 4] Part E, Section 7.8.5).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, num_enum::IntoPrimitive)]
#[repr(u8)]
pub enum AdvType {
    /// Connectable and scannable undirected advertising.
    #[default]
    ConnectableUndirected = 0x00,
    /// Connectable high duty cycle directed advertising.
    ConnectableDirected = 0x01,
    /// Scannable undirected advertising.
    ScannableUndirected = 0x02,
    /// Non-connectable undirected advertising.
    NonConnectableUndirected = 0x03,
}
