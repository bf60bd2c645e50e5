//! Closed sets of coded values
//!
//! Each enum is stored and transmitted as its code (`"VENTILATOR"`), never as
//! a display label. Labels live in [`crate::labels`].

use serde::{Deserialize, Serialize};

/// A string that is not one of the codes of a coded enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{value}\" is not a valid {kind}")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub value: String,
}

/// Defines a coded enum together with its code table.
///
/// Generates `ALL`, `as_code`, `Display` (the code) and `FromStr`
/// (exact, case-sensitive code match).
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Code used in storage and on the wire.
            pub fn as_code(&self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_code())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = UnknownCode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok($name::$variant),)+
                    _ => Err(UnknownCode {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

coded_enum! {
    /// Kind of medical equipment.
    DeviceType, "device type" {
        InfusionPump => "INFUSION_PUMP",
        Ventilator => "VENTILATOR",
        EcgMachine => "ECG_MACHINE",
        Monitor => "MONITOR",
        Defibrillator => "DEFIBRILLATOR",
        Ultrasound => "ULTRASOUND",
        Xray => "XRAY",
        Mri => "MRI",
        CtScanner => "CT_SCANNER",
        Anesthesia => "ANESTHESIA",
    }
}

coded_enum! {
    /// Operational status of a device.
    DeviceStatus, "status" {
        Active => "ACTIVE",
        InMaintenance => "IN_MAINTENANCE",
        InRepair => "IN_REPAIR",
        Decommissioned => "DECOMMISSIONED",
        Available => "AVAILABLE",
        InUse => "IN_USE",
    }
}

coded_enum! {
    /// Kind of maintenance event.
    MaintenanceType, "maintenance type" {
        Preventive => "PREVENTIVE",
        Corrective => "CORRECTIVE",
        Calibration => "CALIBRATION",
        Inspection => "INSPECTION",
    }
}

coded_enum! {
    /// Kind of document attached to a device.
    DocumentType, "document type" {
        Manual => "MANUAL",
        Warranty => "WARRANTY",
        Certificate => "CERTIFICATE",
        Invoice => "INVOICE",
        Other => "OTHER",
    }
}

impl Default for DeviceStatus {
    fn default() -> Self {
        DeviceStatus::Available
    }
}
