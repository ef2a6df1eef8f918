//! Script templates and signature-operation counting
//!
//! Scripts are never executed here. Validation only needs to recognise a few
//! output templates and to count signature operations the way the script
//! interpreter would charge them.

use crate::types::ByteString;

/// Opcode constants used by template matching and sig-op counting
pub mod opcodes {
    pub const OP_0: u8 = 0x00;
    pub const OP_PUSHDATA1: u8 = 0x4c;
    pub const OP_PUSHDATA2: u8 = 0x4d;
    pub const OP_PUSHDATA4: u8 = 0x4e;
    pub const OP_1NEGATE: u8 = 0x4f;
    pub const OP_RESERVED: u8 = 0x50;
    pub const OP_1: u8 = 0x51;
    pub const OP_2: u8 = 0x52;
    pub const OP_3: u8 = 0x53;
    pub const OP_16: u8 = 0x60;
    pub const OP_IF: u8 = 0x63;
    pub const OP_ELSE: u8 = 0x67;
    pub const OP_ENDIF: u8 = 0x68;
    pub const OP_RETURN: u8 = 0x6a;
    pub const OP_DUP: u8 = 0x76;
    pub const OP_EQUAL: u8 = 0x87;
    pub const OP_EQUALVERIFY: u8 = 0x88;
    pub const OP_SHA256: u8 = 0xa8;
    pub const OP_HASH160: u8 = 0xa9;
    pub const OP_CHECKSIG: u8 = 0xac;
    pub const OP_CHECKSIGVERIFY: u8 = 0xad;
    pub const OP_CHECKMULTISIG: u8 = 0xae;
    pub const OP_CHECKMULTISIGVERIFY: u8 = 0xaf;

    /// Pushes true when evaluated inside a coinstake transaction (redefines OP_NOP9)
    pub const OP_ISCOINSTAKE: u8 = 0xb8;
}

use opcodes::*;

/// Maximum number of public keys in a multisig (for sigop counting)
/// This is used when we can't accurately determine the number from the script
const MAX_PUBKEYS_PER_MULTISIG: u32 = 20;

/// Read one opcode at `*pc`, returning it with its push payload
///
/// Matches the interpreter's GetOp: returns `None` at the end of the script
/// or when a push runs past it.
pub fn get_op<'s>(script: &'s [u8], pc: &mut usize) -> Option<(u8, &'s [u8])> {
    let opcode = *script.get(*pc)?;
    let mut i = *pc + 1;

    let len = match opcode {
        0x01..=0x4b => opcode as usize,
        OP_PUSHDATA1 => {
            let len = *script.get(i)? as usize;
            i += 1;
            len
        }
        OP_PUSHDATA2 => {
            let bytes = script.get(i..i + 2)?;
            i += 2;
            u16::from_le_bytes([bytes[0], bytes[1]]) as usize
        }
        OP_PUSHDATA4 => {
            let bytes = script.get(i..i + 4)?;
            i += 4;
            u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize
        }
        _ => 0,
    };

    let end = i.checked_add(len)?;
    let data = script.get(i..end)?;
    *pc = end;
    Some((opcode, data))
}

/// Count sigops in a script
///
/// Counts OP_CHECKSIG, OP_CHECKSIGVERIFY, OP_CHECKMULTISIG, OP_CHECKMULTISIGVERIFY.
/// Bytes inside push data are never counted. In accurate mode a multisig
/// preceded by OP_1..OP_16 counts that many keys, otherwise 20.
pub fn count_sigops_in_script(script: &[u8], accurate: bool) -> u32 {
    let mut count = 0u32;
    let mut last_opcode: Option<u8> = None;
    let mut pc = 0;

    while let Some((opcode, _)) = get_op(script, &mut pc) {
        match opcode {
            OP_CHECKSIG | OP_CHECKSIGVERIFY => count = count.saturating_add(1),
            OP_CHECKMULTISIG | OP_CHECKMULTISIGVERIFY => {
                let keys = match last_opcode {
                    Some(prev @ OP_1..=OP_16) if accurate => (prev - OP_1 + 1) as u32,
                    _ => MAX_PUBKEYS_PER_MULTISIG,
                };
                count = count.saturating_add(keys);
            }
            _ => {}
        }
        last_opcode = Some(opcode);
    }

    count
}

/// Last item pushed by a push-only scriptSig
///
/// Returns `None` if the scriptSig contains any non-push opcode or is malformed.
pub fn last_push(script_sig: &[u8]) -> Option<&[u8]> {
    let mut pc = 0;
    let mut last: Option<&[u8]> = None;
    while pc < script_sig.len() {
        let (opcode, data) = get_op(script_sig, &mut pc)?;
        if opcode > OP_16 {
            return None;
        }
        last = Some(data);
    }
    last
}

/// OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
pub fn is_pay_to_public_key_hash(script: &[u8]) -> bool {
    script.len() == 25
        && script[0] == OP_DUP
        && script[1] == OP_HASH160
        && script[2] == 0x14
        && script[23] == OP_EQUALVERIFY
        && script[24] == OP_CHECKSIG
}

/// OP_HASH160 <20 bytes> OP_EQUAL
pub fn is_pay_to_script_hash(script: &[u8]) -> bool {
    script.len() == 23 && script[0] == OP_HASH160 && script[1] == 0x14 && script[22] == OP_EQUAL
}

/// OP_SHA256 <32 bytes> OP_EQUAL
pub fn is_pay_to_script_hash_256(script: &[u8]) -> bool {
    script.len() == 35 && script[0] == OP_SHA256 && script[1] == 0x20 && script[34] == OP_EQUAL
}

/// Script starts with OP_ISCOINSTAKE
#[inline]
pub fn has_is_coinstake_op(script: &[u8]) -> bool {
    script.first() == Some(&OP_ISCOINSTAKE)
}

/// Split `OP_ISCOINSTAKE OP_IF <stake> OP_ELSE <spend> OP_ENDIF` into its branches
fn split_coinstake_script(script: &[u8]) -> Option<(&[u8], &[u8])> {
    if script.len() < 2 || script[0] != OP_ISCOINSTAKE || script[1] != OP_IF {
        return None;
    }

    let mut pc = 2;
    let mut else_at = None;
    while pc < script.len() {
        let start = pc;
        let (opcode, _) = get_op(script, &mut pc)?;
        match (opcode, else_at) {
            (OP_ELSE, None) => else_at = Some(start),
            (OP_ENDIF, Some(else_pos)) => {
                return Some((&script[2..else_pos], &script[else_pos + 1..start]));
            }
            _ => {}
        }
    }
    None
}

/// Branch taken when the output is spent by a coinstake transaction
pub fn coinstake_script_path(script: &[u8]) -> Option<&[u8]> {
    split_coinstake_script(script).map(|(stake, _)| stake)
}

/// Branch taken by any other spending transaction
pub fn non_coinstake_script_path(script: &[u8]) -> Option<&[u8]> {
    split_coinstake_script(script).map(|(_, spend)| spend)
}

/// OP_ISCOINSTAKE script whose ordinary spend branch is plain P2PKH
pub fn is_spend_script_p2pkh(script: &[u8]) -> bool {
    non_coinstake_script_path(script).is_some_and(is_pay_to_public_key_hash)
}

/// P2SH, P2SH256, or for coinstake spends a stake branch that is either
pub fn is_pay_to_script_hash_any(script: &[u8], is_coinstake_tx: bool) -> bool {
    if is_pay_to_script_hash(script) || is_pay_to_script_hash_256(script) {
        return true;
    }
    if is_coinstake_tx {
        if let Some(stake) = coinstake_script_path(script) {
            return is_pay_to_script_hash(stake) || is_pay_to_script_hash_256(stake);
        }
    }
    false
}

/// Sigops of the redeem script pushed last by `script_sig`
///
/// Returns 0 when `script_sig` is not push-only.
pub fn p2sh_sigop_count(script_sig: &[u8]) -> u32 {
    last_push(script_sig)
        .map(|redeem| count_sigops_in_script(redeem, true))
        .unwrap_or(0)
}

/// Build a P2PKH script for `hash`
pub fn p2pkh_script(hash: &[u8; 20]) -> ByteString {
    let mut script = Vec::with_capacity(25);
    script.extend_from_slice(&[OP_DUP, OP_HASH160, 0x14]);
    script.extend_from_slice(hash);
    script.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
    script
}

/// Build a P2SH script for `hash`
pub fn p2sh_script(hash: &[u8; 20]) -> ByteString {
    let mut script = Vec::with_capacity(23);
    script.extend_from_slice(&[OP_HASH160, 0x14]);
    script.extend_from_slice(hash);
    script.push(OP_EQUAL);
    script
}

/// Build `OP_ISCOINSTAKE OP_IF <stake> OP_ELSE <spend> OP_ENDIF`
pub fn coinstake_script(stake: &[u8], spend: &[u8]) -> ByteString {
    let mut script = Vec::with_capacity(stake.len() + spend.len() + 4);
    script.extend_from_slice(&[OP_ISCOINSTAKE, OP_IF]);
    script.extend_from_slice(stake);
    script.push(OP_ELSE);
    script.extend_from_slice(spend);
    script.push(OP_ENDIF);
    script
}
