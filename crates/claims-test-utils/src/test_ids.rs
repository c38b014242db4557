//! Fixed test ids and constants.

// User ids (100-199)
pub const TEST_USER_ALICE: i64 = 100;
pub const TEST_USER_BOB: i64 = 101;

// Ids that are never inserted
pub const TEST_USER_UNKNOWN: i64 = 999;

// Signing key ids
pub const TEST_KEY_ID_1: &str = "test-key-2025-01";
pub const TEST_KEY_ID_2: &str = "test-key-2025-02";

pub const TEST_REALM_URL: &str = "https://realm.test";
pub const TEST_NAMESPACE: &str = "app";
