//! Opaque token encoding and generation

pub mod codec;

pub use codec::{
    constant_time_compare, decode_base36, derive_verification_key, encode_base36,
    generate_invite_code, is_well_formed_key, INVITE_CODE_LEN, VERIFICATION_KEY_LEN,
};
