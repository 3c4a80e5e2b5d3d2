/// Life path sums kept without further reduction.
pub const MASTER_NUMBERS: [u32; 3] = [11, 22, 33];

/// Persisted chat history window (most recent messages).
pub const CHAT_HISTORY_LIMIT: usize = 50;

/// Prefix for minted asset identifiers: `PBA-ASSET-XXXXXXXXX`.
pub const ASSET_ID_PREFIX: &str = "PBA-ASSET-";

/// Random base-36 characters following the asset prefix.
pub const ASSET_ID_SUFFIX_LEN: usize = 9;

/// Initiation sequence shown between intake and the dashboard.
pub const CINEMATIC_SEQUENCE: [&str; 5] = [
    "ESTABLISHING SECURE UPLINK...",
    "DECRYPTING SOURCE CODE ARCHIVE...",
    "EXTRACTING SPIRITUAL BIOMETRICS...",
    "SYNCHRONIZING TACTICAL TRAJECTORY...",
    "ASSET AUTHORIZED. CLEARANCE OMEGA.",
];

/// Ops terminal greeting lines.
pub const TERMINAL_GREETING: [&str; 2] = ["SYSTEM READY. WELCOME AGENT.", "TYPE 'HELP' FOR DIRECTIVES."];
