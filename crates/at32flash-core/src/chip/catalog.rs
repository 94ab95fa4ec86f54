//! Table of known AT32F4xx parts
//!
//! Several product IDs appear more than once with different parts. Lookup
//! walks the table in order, so the earlier entry wins.

use super::types::{ChipDescriptor, McuFamily, RegisterFamily};

macro_rules! family {
    ($ident:ident, $name:literal, $regs:ident, $usd:literal) => {
        #[doc = concat!($name, " series")]
        pub static $ident: McuFamily = McuFamily {
            name: $name,
            register_family: RegisterFamily::$regs,
            option_byte_base: $usd,
        };
    };
}

family!(AT32F403, "AT32F403", LegacyFlashReg, 0x1FFF_F800);
family!(AT32F413, "AT32F413", LegacyFlashReg, 0x1FFF_F800);
family!(AT32F415, "AT32F415", LegacyFlashReg, 0x1FFF_F800);
family!(AT32F403A, "AT32F403A", LegacyFlashReg, 0x1FFF_F800);
family!(AT32F407, "AT32F407", LegacyFlashReg, 0x1FFF_F800);
family!(AT32F421, "AT32F421", LegacyFlashReg, 0x1FFF_F800);
family!(AT32F435, "AT32F435", HighDensityFlashReg, 0x1FFF_C000);
family!(AT32F437, "AT32F437", HighDensityFlashReg, 0x1FFF_C000);
family!(AT32F425, "AT32F425", LegacyFlashReg, 0x1FFF_F800);
family!(AT32L021, "AT32L021", LegacyFlashReg, 0x1FFF_F800);
family!(AT32WB415, "AT32WB415", LegacyFlashReg, 0x1FFF_F800);
family!(AT32F423, "AT32F423", HighDensityFlashReg, 0x1FFF_F800);

const fn chip(
    product_id: u32,
    flash_size_kb: u32,
    sector_size: u32,
    family: &'static McuFamily,
    suffix: &'static str,
) -> ChipDescriptor {
    ChipDescriptor {
        product_id,
        flash_size_kb,
        sector_size,
        family,
        suffix,
    }
}

/// All parts the driver knows, in lookup order
#[rustfmt::skip]
pub static KNOWN_CHIPS: &[ChipDescriptor] = &[
    chip(0x7005_0242,  256, 2048, &AT32F403A, "CCT7"),
    chip(0x7005_0243,  256, 2048, &AT32F403A, "CCU7"),
    chip(0x7005_02CF,  512, 2048, &AT32F403A, "CET7"),
    chip(0x7005_02D0,  512, 2048, &AT32F403A, "CEU7"),
    chip(0x7005_0346, 1024, 2048, &AT32F403A, "CGT7"),
    chip(0x7005_0347, 1024, 2048, &AT32F403A, "CGU7"),
    chip(0x7005_0241,  256, 2048, &AT32F403A, "RCT7"),
    chip(0x7005_02CE,  512, 2048, &AT32F403A, "RET7"),
    chip(0x7005_0345, 1024, 2048, &AT32F403A, "RGT7"),
    chip(0x7005_0240,  256, 2048, &AT32F403A, "VCT7"),
    chip(0x7005_02CD,  512, 2048, &AT32F403A, "VET7"),
    chip(0x7005_0344, 1024, 2048, &AT32F403A, "VGT7"),
    chip(0xF005_0355, 1024, 2048, &AT32F403A, "VGW"),
    chip(0x7003_01CF,  128, 1024, &AT32F403, "CBT6"),
    chip(0x7005_0243,  256, 2048, &AT32F403, "CCT6"),
    chip(0x7005_024E,  256, 2048, &AT32F403, "CCU6"),
    chip(0x7005_02CB,  512, 2048, &AT32F403, "CET6"),
    chip(0x7005_02CD,  512, 2048, &AT32F403, "CEU6"),
    chip(0x7005_0347, 1024, 2048, &AT32F403, "CGT6"),
    chip(0x7005_034C, 1024, 2048, &AT32F403, "CGU6"),
    chip(0x7005_0242,  256, 2048, &AT32F403, "RCT6"),
    chip(0x7005_02CA,  512, 2048, &AT32F403, "RET6"),
    chip(0x7005_0346, 1024, 2048, &AT32F403, "RGT6"),
    chip(0x7005_0241,  256, 2048, &AT32F403, "VCT6"),
    chip(0x7005_02C9,  512, 2048, &AT32F403, "VET6"),
    chip(0x7005_0345, 1024, 2048, &AT32F403, "VGT6"),
    chip(0x7005_0240,  256, 2048, &AT32F403, "ZCT6"),
    chip(0x7005_02C8,  512, 2048, &AT32F403, "ZET6"),
    chip(0x7005_0344, 1024, 2048, &AT32F403, "ZGT6"),
    chip(0x7005_0254,  256, 2048, &AT32F407, "AVCT7"),
    chip(0x7005_0353, 1024, 2048, &AT32F407, "AVGT7"),
    chip(0x7005_024A,  256, 2048, &AT32F407, "RCT7"),
    chip(0x7005_02D2,  512, 2048, &AT32F407, "RET7"),
    chip(0x7005_034C, 1024, 2048, &AT32F407, "RGT7"),
    chip(0x7005_0249,  256, 2048, &AT32F407, "VCT7"),
    chip(0x7005_02D1,  512, 2048, &AT32F407, "VET7"),
    chip(0x7005_034B, 1024, 2048, &AT32F407, "VGT7"),
    chip(0x7003_0106,   64, 1024, &AT32F413, "C8T7"),
    chip(0x7003_01C3,  128, 1024, &AT32F413, "CBT7"),
    chip(0x7003_01CA,  128, 1024, &AT32F413, "CBU7"),
    chip(0x7003_0242,  256, 2048, &AT32F413, "CCT7"),
    chip(0x7003_0247,  256, 2048, &AT32F413, "CCU7"),
    chip(0x7003_01C5,  128, 1024, &AT32F413, "KBU7-4"),
    chip(0x7003_0244,  256, 2048, &AT32F413, "KCU7-4"),
    chip(0x7003_01C1,  128, 1024, &AT32F413, "RBT7"),
    chip(0x7003_0240,  256, 2048, &AT32F413, "RCT7"),
    chip(0x7003_01CB,  128, 1024, &AT32F413, "TBU7"),
    chip(0x7003_0109,   64, 1024, &AT32F415, "C8T7"),
    chip(0x7003_01C5,  128, 1024, &AT32F415, "CBT7"),
    chip(0x7003_01CD,  128, 1024, &AT32F415, "CBU7"),
    chip(0x7003_0241,  256, 2048, &AT32F415, "CCT7"),
    chip(0x7003_024C,  256, 2048, &AT32F415, "CCU7"),
    chip(0x7003_010A,   64, 1024, &AT32F415, "K8U7-4"),
    chip(0x7003_01C6,  128, 1024, &AT32F415, "KBU7-4"),
    chip(0x7003_0242,  256, 2048, &AT32F415, "KCU7-4"),
    chip(0x7003_010B,   64, 1024, &AT32F415, "R8T7-7"),
    chip(0x7003_0108,   64, 1024, &AT32F415, "R8T7"),
    chip(0x7003_01C7,  128, 1024, &AT32F415, "RBT7-7"),
    chip(0x7003_01C4,  128, 1024, &AT32F415, "RBT7"),
    chip(0x7003_01CF,  128, 1024, &AT32F415, "RBW"),
    chip(0x7003_0243,  256, 2048, &AT32F415, "RCT7-7"),
    chip(0x7003_0240,  256, 2048, &AT32F415, "RCT7"),
    chip(0x7003_024E,  256, 2048, &AT32F415, "RCW"),
    chip(0x5001_000C,   16, 1024, &AT32F421, "C4T7"),
    chip(0x5002_0086,   32, 1024, &AT32F421, "C6T7"),
    chip(0x5002_0100,   64, 1024, &AT32F421, "C8T7"),
    chip(0xD002_0100,   64, 1024, &AT32F421, "C8W-YY"),
    chip(0x5002_0117,   64, 1024, &AT32F421, "C8W"),
    chip(0x5001_0011,   16, 1024, &AT32F421, "F4P7"),
    chip(0x5001_0010,   16, 1024, &AT32F421, "F4U7"),
    chip(0x5002_008B,   32, 1024, &AT32F421, "F6P7"),
    chip(0x5002_008A,   32, 1024, &AT32F421, "F6U7"),
    chip(0x5002_0105,   64, 1024, &AT32F421, "F8P7"),
    chip(0x5002_0104,   64, 1024, &AT32F421, "F8U7"),
    chip(0x5001_0014,   16, 1024, &AT32F421, "G4U7"),
    chip(0x5002_0093,   32, 1024, &AT32F421, "G6U7"),
    chip(0x5002_0112,   64, 1024, &AT32F421, "G8U7"),
    chip(0x5001_000D,   16, 1024, &AT32F421, "K4T7"),
    chip(0x5001_000F,   16, 1024, &AT32F421, "K4U7-4"),
    chip(0x5001_000E,   16, 1024, &AT32F421, "K4U7"),
    chip(0x5002_0087,   32, 1024, &AT32F421, "K6T7"),
    chip(0x5002_0089,   32, 1024, &AT32F421, "K6U7-4"),
    chip(0x5002_0088,   32, 1024, &AT32F421, "K6U7"),
    chip(0x5002_0101,   64, 1024, &AT32F421, "K8T7"),
    chip(0x5002_0103,   64, 1024, &AT32F421, "K8U7-4"),
    chip(0x5002_0102,   64, 1024, &AT32F421, "K8U7"),
    chip(0x5001_0016,   16, 1024, &AT32F421, "PF4P7"),
    chip(0x5002_0115,   64, 1024, &AT32F421, "PF8P7"),
    chip(0x7003_210B,   64, 1024, &AT32F423, "C8T7"),
    chip(0x7003_210E,   64, 1024, &AT32F423, "C8U7"),
    chip(0x700A_21CA,  128, 1024, &AT32F423, "CBT7"),
    chip(0x700A_21CD,  128, 1024, &AT32F423, "CBU7"),
    chip(0x700A_3249,  256, 2048, &AT32F423, "CCT7"),
    chip(0x700A_324C,  256, 2048, &AT32F423, "CCU7"),
    chip(0x7003_2115,   64, 1024, &AT32F423, "K8U7-4"),
    chip(0x700A_21D4,  128, 1024, &AT32F423, "KBU7-4"),
    chip(0x700A_3253,  256, 2048, &AT32F423, "KCU7-4"),
    chip(0x7003_2108,   64, 1024, &AT32F423, "R8T7-7"),
    chip(0x7003_2105,   64, 1024, &AT32F423, "R8T7"),
    chip(0x700A_21C7,  128, 1024, &AT32F423, "RBT7-7"),
    chip(0x700A_21C4,  128, 1024, &AT32F423, "RBT7"),
    chip(0x700A_3246,  256, 2048, &AT32F423, "RCT7-7"),
    chip(0x700A_3243,  256, 2048, &AT32F423, "RCT7"),
    chip(0x7003_2112,   64, 1024, &AT32F423, "T8U7"),
    chip(0x700A_21D1,  128, 1024, &AT32F423, "TBU7"),
    chip(0x700A_3250,  256, 2048, &AT32F423, "TCU7"),
    chip(0x7003_2102,   64, 1024, &AT32F423, "V8T7"),
    chip(0x700A_21C1,  128, 1024, &AT32F423, "VBT7"),
    chip(0x700A_3240,  256, 2048, &AT32F423, "VCT7"),
    chip(0x5009_2087,   32, 1024, &AT32F425, "C6T7"),
    chip(0x5009_208A,   32, 1024, &AT32F425, "C6U7"),
    chip(0x5009_2106,   64, 1024, &AT32F425, "C8T7"),
    chip(0x5009_2109,   64, 1024, &AT32F425, "C8U7"),
    chip(0x5009_2093,   32, 1024, &AT32F425, "F6P7"),
    chip(0x5009_2112,   64, 1024, &AT32F425, "F8P7"),
    chip(0x5009_2096,   32, 1024, &AT32F425, "G6U7"),
    chip(0x5009_2115,   64, 1024, &AT32F425, "G8U7"),
    chip(0x5009_208D,   32, 1024, &AT32F425, "K6T7"),
    chip(0x5009_2090,   32, 1024, &AT32F425, "K6U7-4"),
    chip(0x5009_210C,   64, 1024, &AT32F425, "K8T7"),
    chip(0x5009_210F,   64, 1024, &AT32F425, "K8U7-4"),
    chip(0x5009_2084,   32, 1024, &AT32F425, "R6T7-7"),
    chip(0x5009_2081,   32, 1024, &AT32F425, "R6T7"),
    chip(0x5009_2103,   64, 1024, &AT32F425, "R8T7-7"),
    chip(0x5009_2100,   64, 1024, &AT32F425, "R8T7"),
    chip(0x7008_449A,  192, 4096, &AT32F435, "CCT7-W"),
    chip(0x7008_324B,  256, 2048, &AT32F435, "CCT7"),
    chip(0x7008_449D,  192, 4096, &AT32F435, "CCU7-W"),
    chip(0x7008_324E,  256, 2048, &AT32F435, "CCU7"),
    chip(0x7008_44D9,  960, 4096, &AT32F435, "CGT7-W"),
    chip(0x7008_334A, 1024, 2048, &AT32F435, "CGT7"),
    chip(0x7008_44DC,  960, 4096, &AT32F435, "CGU7-W"),
    chip(0x7008_334D, 1024, 2048, &AT32F435, "CGU7"),
    chip(0x7008_4558, 4032, 4096, &AT32F435, "CMT7-E"),
    chip(0x7008_4549, 4032, 4096, &AT32F435, "CMT7"),
    chip(0x7008_455B, 4032, 4096, &AT32F435, "CMU7-E"),
    chip(0x7008_454C, 4032, 4096, &AT32F435, "CMU7"),
    chip(0x7008_3248,  256, 2048, &AT32F435, "RCT7"),
    chip(0x7008_3347, 1024, 2048, &AT32F435, "RGT7"),
    chip(0x7008_4546, 4032, 4096, &AT32F435, "RMT7"),
    chip(0x7008_3245,  256, 2048, &AT32F435, "VCT7"),
    chip(0x7008_3344, 1024, 2048, &AT32F435, "VGT7"),
    chip(0x7008_4543, 4032, 4096, &AT32F435, "VMT7"),
    chip(0x7008_3242,  256, 2048, &AT32F435, "ZCT7"),
    chip(0x7008_3341, 1024, 2048, &AT32F435, "ZGT7"),
    chip(0x7008_4540, 4032, 4096, &AT32F435, "ZMT7"),
    chip(0x7008_3257,  256, 2048, &AT32F437, "RCT7"),
    chip(0x7008_3356, 1024, 2048, &AT32F437, "RGT7"),
    chip(0x7008_4555, 4032, 4096, &AT32F437, "RMT7"),
    chip(0x7008_3254,  256, 2048, &AT32F437, "VCT7"),
    chip(0x7008_3353, 1024, 2048, &AT32F437, "VGT7"),
    chip(0x7008_4552, 4032, 4096, &AT32F437, "VMT7"),
    chip(0x7008_3251,  256, 2048, &AT32F437, "ZCT7"),
    chip(0x7008_3350, 1024, 2048, &AT32F437, "ZGT7"),
    chip(0x7008_454F, 4032, 4096, &AT32F437, "ZMT7"),
    chip(0x1001_2006,   16, 1024, &AT32L021, "C4T7"),
    chip(0x1001_208D,   32, 1024, &AT32L021, "C6T7"),
    chip(0x1001_2114,   64, 1024, &AT32L021, "C8T7"),
    chip(0x1001_2001,   16, 1024, &AT32L021, "F4P7"),
    chip(0x1001_2002,   16, 1024, &AT32L021, "F4U7"),
    chip(0x1001_2088,   32, 1024, &AT32L021, "F6P7"),
    chip(0x1001_2089,   32, 1024, &AT32L021, "F6U7"),
    chip(0x1001_210F,   64, 1024, &AT32L021, "F8P7"),
    chip(0x1001_2110,   64, 1024, &AT32L021, "F8U7"),
    chip(0x1001_2000,   16, 1024, &AT32L021, "G4U7"),
    chip(0x1001_2087,   32, 1024, &AT32L021, "G6U7"),
    chip(0x1001_210E,   64, 1024, &AT32L021, "G8U7"),
    chip(0x1001_2005,   16, 1024, &AT32L021, "K4T7"),
    chip(0x1001_2003,   16, 1024, &AT32L021, "K4U7-4"),
    chip(0x1001_2004,   16, 1024, &AT32L021, "K4U7"),
    chip(0x1001_208C,   32, 1024, &AT32L021, "K6T7"),
    chip(0x1001_208A,   32, 1024, &AT32L021, "K6U7-4"),
    chip(0x1001_208B,   32, 1024, &AT32L021, "K6U7"),
    chip(0x1001_2113,   64, 1024, &AT32L021, "K8T7"),
    chip(0x1001_2111,   64, 1024, &AT32L021, "K8U7-4"),
    chip(0x1001_2112,   64, 1024, &AT32L021, "K8U7"),
    chip(0x7003_0250,  256, 2048, &AT32WB415, "CCU7-7"),
];
