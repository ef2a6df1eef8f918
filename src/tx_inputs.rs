//! Input-dependent transaction validation
//!
//! Reconciles the value of the spent coins with the outputs across the
//! plaintext, blinded and anonymized representations, enforces spend
//! maturity and derives the fee.

use crate::coins::CoinLookup;
use crate::constants::MAX_MONEY;
use crate::context::ValidationContext;
use crate::error::{TxRejection, TxResult};
use crate::fees::{format_money, get_virtual_transaction_size, FeeRate};
use crate::params::MaturityRule;
use crate::proofs::ProofOracle;
use crate::transaction::is_coinstake;
use crate::types::*;
use tracing::{trace, warn};

/// What `check_tx_inputs` learned about an accepted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxInputsOutcome {
    /// Fee paid; for a coinstake, the stake reward claimed instead
    pub fee: Integer,
    pub has_anon_input: bool,
    /// The transaction creates anonymized outputs
    pub has_anon_output: bool,
}

#[inline]
fn money_range(value: Integer) -> bool {
    (0..=MAX_MONEY).contains(&value)
}

#[cold]
fn make_missing_inputs_error() -> TxRejection {
    TxRejection::missing_inputs("bad-txns-inputs-missingorspent").with_detail("inputs missing/spent")
}

#[cold]
fn make_input_range_error() -> TxRejection {
    TxRejection::consensus("bad-txns-inputvalues-outofrange")
}

fn check_maturity(
    coin: &Coin,
    spend_height: Natural,
    maturity: Natural,
    rule: Option<MaturityRule>,
) -> TxResult<()> {
    let depth = spend_height as i64 - coin.height as i64;
    if depth >= maturity as i64 {
        return Ok(());
    }

    match rule {
        Some(rule) => {
            let required = rule.required_depth(maturity, coin.height);
            if depth < required as i64 {
                return Err(TxRejection::premature_spend("bad-txns-premature-spend-of-coinbase")
                    .with_detail(format!(
                        "tried to spend coinbase at height {} at depth {depth}, required {required}",
                        coin.height
                    )));
            }
            Ok(())
        }
        None => Err(TxRejection::premature_spend("bad-txns-premature-spend-of-coinbase")
            .with_detail(format!("tried to spend coinbase at depth {depth}"))),
    }
}

/// Check a transaction against the coins it spends
///
/// Returns the fee and the anonymity flags. Rejections are categorised:
/// missing coins are transient (`MissingInputs`), immature reward spends are
/// `PrematureSpend`, everything else is a `Consensus` violation.
///
/// Anonymous inputs carry no visible value; they are counted but their
/// amounts are not checked here.
pub fn check_tx_inputs<O, L>(
    tx: &Transaction,
    ctx: &ValidationContext<'_, O>,
    coins: &L,
    spend_height: Natural,
) -> TxResult<TxInputsOutcome>
where
    O: ProofOracle + ?Sized,
    L: CoinLookup + ?Sized,
{
    let mut outcome = TxInputsOutcome::default();
    let typed = tx.is_typed();

    if typed && tx.inputs.is_empty() {
        return Err(TxRejection::consensus("bad-txn-no-inputs").with_detail("no inputs"));
    }

    if !coins.have_inputs(tx) {
        return Err(make_missing_inputs_error());
    }

    let maturity = ctx.params.coinbase_maturity;
    let maturity_rule = typed.then_some(ctx.params.maturity_rule);

    let mut commits_in: Vec<Commitment> = Vec::new();
    let mut commits_out: Vec<Commitment> = Vec::new();
    let mut counts = KindCounts::default();
    let mut value_in = 0i64;

    for input in &tx.inputs {
        if input.is_anon() {
            outcome.has_anon_input = true;
            counts.anonymized += 1;
            continue;
        }

        // Present and unspent: `have_inputs` passed on the same snapshot
        let coin = coins.get(&input.prevout).ok_or_else(make_missing_inputs_error)?;
        debug_assert!(!coin.spent, "have_inputs accepted a spent coin");
        if coin.spent {
            return Err(make_missing_inputs_error());
        }

        if coin.is_block_reward() {
            check_maturity(coin, spend_height, maturity, maturity_rule)?;
        }

        match (typed, coin.output_type) {
            (true, OutputType::Confidential) => {
                let commitment = coin.commitment.ok_or_else(|| {
                    TxRejection::consensus("bad-txns-input-type").with_detail("blinded coin without commitment")
                })?;
                commits_in.push(commitment);
                counts.confidential += 1;
            }
            (true, OutputType::Anonymized | OutputType::Data) => {
                return Err(TxRejection::consensus("bad-txns-input-type"));
            }
            (_, _) => {
                value_in = value_in.saturating_add(coin.value);
                if !money_range(coin.value) || !money_range(value_in) {
                    return Err(make_input_range_error());
                }
                if typed {
                    counts.standard += 1;
                }
            }
        }
    }

    if counts.kinds_present() > 1 {
        return Err(TxRejection::consensus("mixed-input-types"));
    }

    let anon_inputs = counts.anonymized;
    // Output kinds are added to the same counters as the inputs
    let mut plain_value_out = tx.plain_value_out(&mut counts);
    outcome.has_anon_output = counts.anonymized > anon_inputs;

    let fee;
    if typed {
        if !is_coinstake(tx) {
            if counts.confidential > 0 || counts.anonymized > 0 {
                fee = tx
                    .ct_fee()
                    .ok_or_else(|| TxRejection::consensus("bad-fee-output"))?;
            } else {
                if value_in < plain_value_out {
                    return Err(TxRejection::consensus("bad-txns-in-belowout").with_detail(format!(
                        "value in ({}) < value out ({})",
                        format_money(value_in),
                        format_money(plain_value_out)
                    )));
                }
                fee = value_in - plain_value_out;
            }

            if fee < 0 {
                return Err(TxRejection::consensus("bad-txns-fee-negative"));
            }
            if !money_range(fee) {
                return Err(TxRejection::consensus("bad-txns-fee-outofrange"));
            }

            let msg_fees = tx.total_smsg_fees();
            if msg_fees > 0 {
                let vsize = get_virtual_transaction_size(tx);
                let expected = msg_fees
                    .saturating_add(FeeRate::new(ctx.params.smsg_fee_funding_tx_per_k).fee(vsize));
                if fee < expected {
                    if ctx.flags.enforce_smsg_fees {
                        return Err(TxRejection::consensus("bad-txns-fee-smsg").with_detail(format!(
                            "fees ({}) < expected ({})",
                            format_money(fee),
                            format_money(expected)
                        )));
                    }
                    warn!(fee, expected, "bad-txns-fee-smsg, not enforcing");
                }
            }
        } else {
            // The coinstake reports its reward in place of a fee
            fee = plain_value_out.saturating_sub(value_in);
            // Counters cover inputs and outputs alike
            if counts.confidential > 0 || counts.anonymized > 0 {
                return Err(TxRejection::consensus("bad-coinstake-output")
                    .with_detail("non-standard elements in coinstake"));
            }
        }
    } else {
        let value_out = tx.value_out();
        if value_in < value_out {
            return Err(TxRejection::consensus("bad-txns-in-belowout").with_detail(format!(
                "value in ({}) < value out ({})",
                format_money(value_in),
                format_money(value_out)
            )));
        }
        fee = value_in - value_out;
        if !money_range(fee) {
            return Err(TxRejection::consensus("bad-txns-fee-outofrange"));
        }
    }

    if counts.confidential > 0 && counts.anonymized == 0 {
        plain_value_out = plain_value_out.saturating_add(fee);
        if !money_range(plain_value_out) {
            return Err(TxRejection::consensus("bad-txns-out-outofrange"));
        }
        if !money_range(value_in) {
            return Err(make_input_range_error());
        }

        if value_in > 0 {
            let commitment = ctx
                .oracle
                .commit_plain(value_in)
                .ok_or_else(|| TxRejection::consensus("commit-failed"))?;
            commits_in.push(commitment);
        }
        if plain_value_out > 0 {
            let commitment = ctx
                .oracle
                .commit_plain(plain_value_out)
                .ok_or_else(|| TxRejection::consensus("commit-failed"))?;
            commits_out.push(commitment);
        }
        commits_out.extend(tx.typed_outputs.iter().filter_map(TypedOutput::commitment).copied());

        if !ctx.oracle.verify_tally(&commits_in, &commits_out) {
            return Err(TxRejection::consensus("bad-commitment-sum"));
        }
    }

    outcome.fee = fee;
    trace!(
        fee,
        has_anon_input = outcome.has_anon_input,
        has_anon_output = outcome.has_anon_output,
        "transaction inputs valid"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coins::CoinSet;
    use crate::config::ValidatorConfig;
    use crate::constants::*;
    use crate::context::ActivationFlags;
    use crate::params::ConsensusParams;
    use crate::proofs::ProofSystem;
    use crate::script::p2pkh_script;
    use crate::serialization::varint::encode_data_varint;
    use std::cell::RefCell;

    /// Commits a value to its little-endian bytes and records tally calls
    struct RecordingOracle {
        tally_ok: bool,
        tallies: RefCell<Vec<(Vec<Commitment>, Vec<Commitment>)>>,
    }

    impl RecordingOracle {
        fn new(tally_ok: bool) -> Self {
            Self { tally_ok, tallies: RefCell::new(vec![]) }
        }
    }

    fn plain(value: Integer) -> Commitment {
        let mut bytes = [0u8; 33];
        bytes[0] = 0x08;
        bytes[1..9].copy_from_slice(&value.to_le_bytes());
        Commitment(bytes)
    }

    impl ProofOracle for RecordingOracle {
        fn verify_range_proof(&self, _: &Commitment, _: &[u8], _: ProofSystem) -> bool {
            true
        }
        fn commit_plain(&self, value: Integer) -> Option<Commitment> {
            Some(plain(value))
        }
        fn verify_tally(&self, inputs: &[Commitment], outputs: &[Commitment]) -> bool {
            self.tallies.borrow_mut().push((inputs.to_vec(), outputs.to_vec()));
            self.tally_ok
        }
    }

    fn params() -> ConsensusParams {
        ConsensusParams::regtest()
    }

    fn run(
        tx: &Transaction,
        coins: &CoinSet,
        spend_height: Natural,
        oracle: &RecordingOracle,
        flags: ActivationFlags,
    ) -> TxResult<TxInputsOutcome> {
        let params = params();
        let config = ValidatorConfig::default();
        let ctx = ValidationContext::at_time(&params, &config, oracle, 0).with_flags(flags);
        check_tx_inputs(tx, &ctx, coins, spend_height)
    }

    fn input(hash: u8, index: u32) -> TransactionInput {
        TransactionInput {
            prevout: OutPoint::new([hash; 32], index),
            sequence: SEQUENCE_FINAL,
            script_sig: vec![],
            witness: vec![],
        }
    }

    fn typed(inputs: Vec<TransactionInput>, outputs: Vec<TypedOutput>) -> Transaction {
        Transaction {
            version: TYPED_TXN_VERSION,
            inputs,
            outputs: vec![],
            typed_outputs: outputs,
            lock_time: 0,
        }
    }

    fn standard(value: Integer) -> TypedOutput {
        TypedOutput::Standard { value, script_pubkey: p2pkh_script(&[1; 20]) }
    }

    fn blind(tag: u8) -> TypedOutput {
        TypedOutput::Confidential {
            commitment: Commitment([tag; 33]),
            data: vec![0; 33],
            script_pubkey: p2pkh_script(&[2; 20]),
            range_proof: vec![0; 600],
        }
    }

    fn anon(tag: u8) -> TypedOutput {
        TypedOutput::Anonymized {
            pubkey: [2; 33],
            commitment: Commitment([tag; 33]),
            data: vec![0; 33],
            range_proof: vec![0; 600],
            anon_index: None,
        }
    }

    fn fee_output(fee: u64) -> TypedOutput {
        let mut data = vec![DO_FEE];
        data.extend(encode_data_varint(fee));
        TypedOutput::Data { data }
    }

    fn code(result: TxResult<TxInputsOutcome>) -> &'static str {
        result.unwrap_err().code
    }

    #[test]
    fn test_plain_fee() {
        let mut coins = CoinSet::new();
        coins.insert(OutPoint::new([1; 32], 0), Coin::standard(1000, vec![], 10));
        let tx = typed(vec![input(1, 0)], vec![standard(900)]);

        let oracle = RecordingOracle::new(true);
        let outcome = run(&tx, &coins, 20, &oracle, ActivationFlags::default()).unwrap();
        assert_eq!(outcome, TxInputsOutcome { fee: 100, has_anon_input: false, has_anon_output: false });
        assert!(oracle.tallies.borrow().is_empty());
    }

    #[test]
    fn test_value_in_below_out() {
        let mut coins = CoinSet::new();
        coins.insert(OutPoint::new([1; 32], 0), Coin::standard(1000, vec![], 10));
        let tx = typed(vec![input(1, 0)], vec![standard(1001)]);

        let err = run(&tx, &coins, 20, &RecordingOracle::new(true), ActivationFlags::default()).unwrap_err();
        assert_eq!(err.code, "bad-txns-in-belowout");
        assert_eq!(err.detail.as_deref(), Some("value in (0.00001) < value out (0.00001001)"));
    }

    #[test]
    fn test_missing_inputs_are_transient() {
        let tx = typed(vec![input(1, 0)], vec![standard(1)]);
        let err = run(&tx, &CoinSet::new(), 20, &RecordingOracle::new(true), ActivationFlags::default())
            .unwrap_err();
        assert_eq!(err.code, "bad-txns-inputs-missingorspent");
        assert!(err.is_transient());

        let mut coins = CoinSet::new();
        let mut spent = Coin::standard(10, vec![], 1);
        spent.spent = true;
        coins.insert(OutPoint::new([1; 32], 0), spent);
        let err = run(&tx, &coins, 20, &RecordingOracle::new(true), ActivationFlags::default()).unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn test_typed_without_inputs() {
        let tx = typed(vec![], vec![standard(1)]);
        assert_eq!(
            code(run(&tx, &CoinSet::new(), 20, &RecordingOracle::new(true), ActivationFlags::default())),
            "bad-txn-no-inputs"
        );
    }

    #[test]
    fn test_legacy_fee() {
        let mut coins = CoinSet::new();
        coins.insert(OutPoint::new([1; 32], 0), Coin::standard(5000, vec![], 10));
        let mut tx = Transaction {
            version: 2,
            inputs: vec![input(1, 0)],
            outputs: vec![TransactionOutput { value: 4000, script_pubkey: vec![] }],
            typed_outputs: vec![],
            lock_time: 0,
        };
        let oracle = RecordingOracle::new(true);
        assert_eq!(run(&tx, &coins, 20, &oracle, ActivationFlags::default()).unwrap().fee, 1000);

        tx.outputs[0].value = 6000;
        assert_eq!(code(run(&tx, &coins, 20, &oracle, ActivationFlags::default())), "bad-txns-in-belowout");
    }

    #[test]
    fn test_input_value_range() {
        let mut coins = CoinSet::new();
        coins.insert(OutPoint::new([1; 32], 0), Coin::standard(MAX_MONEY, vec![], 10));
        coins.insert(OutPoint::new([2; 32], 0), Coin::standard(1, vec![], 10));
        let tx = typed(vec![input(1, 0), input(2, 0)], vec![standard(1)]);
        assert_eq!(
            code(run(&tx, &coins, 20, &RecordingOracle::new(true), ActivationFlags::default())),
            "bad-txns-inputvalues-outofrange"
        );
    }

    #[test]
    fn test_maturity_fixed_for_legacy() {
        let mut coin = Coin::standard(5000, vec![], 200);
        coin.is_coinbase = true;
        let mut coins = CoinSet::new();
        coins.insert(OutPoint::new([1; 32], 0), coin);
        let tx = Transaction {
            version: 1,
            inputs: vec![input(1, 0)],
            outputs: vec![TransactionOutput { value: 1, script_pubkey: vec![] }],
            typed_outputs: vec![],
            lock_time: 0,
        };

        let oracle = RecordingOracle::new(true);
        let err = run(&tx, &coins, 299, &oracle, ActivationFlags::default()).unwrap_err();
        assert_eq!(err.code, "bad-txns-premature-spend-of-coinbase");
        assert_eq!(err.category, crate::error::RejectCategory::PrematureSpend);
        assert_eq!(err.detail.as_deref(), Some("tried to spend coinbase at depth 99"));
        assert!(run(&tx, &coins, 300, &oracle, ActivationFlags::default()).is_ok());
    }

    #[test]
    fn test_maturity_scaled_for_typed() {
        let mut coin = Coin::standard(5000, vec![], 10);
        coin.is_coinstake = true;
        let mut coins = CoinSet::new();
        coins.insert(OutPoint::new([1; 32], 0), coin);
        let tx = typed(vec![input(1, 0)], vec![standard(1)]);

        let oracle = RecordingOracle::new(true);
        let err = run(&tx, &coins, 14, &oracle, ActivationFlags::default()).unwrap_err();
        assert_eq!(
            err.detail.as_deref(),
            Some("tried to spend coinbase at height 10 at depth 4, required 5")
        );
        assert!(run(&tx, &coins, 15, &oracle, ActivationFlags::default()).is_ok());
    }

    #[test]
    fn test_mixed_input_types() {
        let mut coins = CoinSet::new();
        coins.insert(OutPoint::new([1; 32], 0), Coin::standard(1000, vec![], 10));
        coins.insert(OutPoint::new([2; 32], 0), Coin::confidential(Commitment([3; 33]), vec![], 10));
        let tx = typed(vec![input(1, 0), input(2, 0)], vec![fee_output(10), blind(4)]);
        assert_eq!(
            code(run(&tx, &coins, 20, &RecordingOracle::new(true), ActivationFlags::default())),
            "mixed-input-types"
        );

        let tx = typed(vec![input(1, 0), input(9, ANON_MARKER)], vec![fee_output(10), anon(4)]);
        assert_eq!(
            code(run(&tx, &coins, 20, &RecordingOracle::new(true), ActivationFlags::default())),
            "mixed-input-types"
        );
    }

    #[test]
    fn test_unsupported_coin_type() {
        let mut coin = Coin::standard(0, vec![], 10);
        coin.output_type = OutputType::Data;
        let mut coins = CoinSet::new();
        coins.insert(OutPoint::new([1; 32], 0), coin);
        let tx = typed(vec![input(1, 0)], vec![standard(0)]);
        assert_eq!(
            code(run(&tx, &coins, 20, &RecordingOracle::new(true), ActivationFlags::default())),
            "bad-txns-input-type"
        );
    }

    #[test]
    fn test_blinded_fee_output_required() {
        let mut coins = CoinSet::new();
        coins.insert(OutPoint::new([1; 32], 0), Coin::standard(1000, vec![], 10));
        let tx = typed(vec![input(1, 0)], vec![blind(4)]);
        assert_eq!(
            code(run(&tx, &coins, 20, &RecordingOracle::new(true), ActivationFlags::default())),
            "bad-fee-output"
        );
    }

    /// Cannot build zero-blind commitments
    struct NoCommitments;

    impl ProofOracle for NoCommitments {
        fn verify_range_proof(&self, _: &Commitment, _: &[u8], _: ProofSystem) -> bool {
            true
        }
        fn commit_plain(&self, _: Integer) -> Option<Commitment> {
            None
        }
        fn verify_tally(&self, _: &[Commitment], _: &[Commitment]) -> bool {
            true
        }
    }

    #[test]
    fn test_blinded_fee_and_balance_rejections() {
        let mut coins = CoinSet::new();
        coins.insert(OutPoint::new([1; 32], 0), Coin::confidential(Commitment([3; 33]), vec![], 10));
        coins.insert(OutPoint::new([2; 32], 0), Coin::standard(MAX_MONEY, vec![], 10));
        let blinded_in = vec![input(1, 0)];
        let plain_in = vec![input(2, 0)];

        let cases: Vec<(Vec<TransactionInput>, Vec<TypedOutput>, &str)> = vec![
            (blinded_in.clone(), vec![fee_output(1u64 << 63), blind(4)], "bad-txns-fee-negative"),
            (blinded_in.clone(), vec![fee_output(u64::MAX), blind(4)], "bad-txns-fee-negative"),
            (
                blinded_in.clone(),
                vec![fee_output(MAX_MONEY as u64 + 1), blind(4)],
                "bad-txns-fee-outofrange",
            ),
            (
                plain_in.clone(),
                vec![fee_output(2), standard(MAX_MONEY - 1), blind(4)],
                "bad-txns-out-outofrange",
            ),
        ];

        for (inputs, outputs, expected) in cases {
            let tx = typed(inputs, outputs);
            let oracle = RecordingOracle::new(true);
            assert_eq!(code(run(&tx, &coins, 20, &oracle, ActivationFlags::default())), expected);
            assert!(oracle.tallies.borrow().is_empty(), "{expected} reached the tally");
        }

        // Fee at the money ceiling is still in range
        let tx = typed(blinded_in, vec![fee_output(MAX_MONEY as u64), blind(4)]);
        assert_eq!(
            run(&tx, &coins, 20, &RecordingOracle::new(true), ActivationFlags::default())
                .unwrap()
                .fee,
            MAX_MONEY
        );
    }

    #[test]
    fn test_commit_failed() {
        let mut coins = CoinSet::new();
        coins.insert(OutPoint::new([1; 32], 0), Coin::standard(1000, vec![], 10));
        let params = params();
        let config = ValidatorConfig::default();
        let oracle = NoCommitments;
        let ctx = ValidationContext::at_time(&params, &config, &oracle, 0)
            .with_flags(ActivationFlags::default());

        // Plaintext value in needs a commitment
        let tx = typed(vec![input(1, 0)], vec![fee_output(100), standard(900), blind(4)]);
        assert_eq!(check_tx_inputs(&tx, &ctx, &coins, 20).unwrap_err().code, "commit-failed");

        // So does plaintext value out, even with only blinded inputs
        coins.insert(OutPoint::new([2; 32], 0), Coin::confidential(Commitment([3; 33]), vec![], 10));
        let tx = typed(vec![input(2, 0)], vec![fee_output(100), blind(4)]);
        assert_eq!(check_tx_inputs(&tx, &ctx, &coins, 20).unwrap_err().code, "commit-failed");
    }

    #[test]
    fn test_commitment_tally() {
        let mut coins = CoinSet::new();
        coins.insert(OutPoint::new([1; 32], 0), Coin::standard(1000, vec![], 10));
        let tx = typed(vec![input(1, 0)], vec![fee_output(100), standard(900), blind(4)]);

        let oracle = RecordingOracle::new(true);
        let outcome = run(&tx, &coins, 20, &oracle, ActivationFlags::default()).unwrap();
        assert_eq!(outcome.fee, 100);

        let tallies = oracle.tallies.borrow();
        assert_eq!(tallies.len(), 1);
        assert_eq!(tallies[0].0, vec![plain(1000)]);
        assert_eq!(tallies[0].1, vec![plain(1000), Commitment([4; 33])]);

        let failing = RecordingOracle::new(false);
        assert_eq!(code(run(&tx, &coins, 20, &failing, ActivationFlags::default())), "bad-commitment-sum");
    }

    #[test]
    fn test_blinded_inputs_join_tally() {
        let mut coins = CoinSet::new();
        coins.insert(OutPoint::new([1; 32], 0), Coin::confidential(Commitment([3; 33]), vec![], 10));
        let tx = typed(vec![input(1, 0)], vec![fee_output(50), blind(4)]);

        let oracle = RecordingOracle::new(true);
        run(&tx, &coins, 20, &oracle, ActivationFlags::default()).unwrap();
        let tallies = oracle.tallies.borrow();
        assert_eq!(tallies[0].0, vec![Commitment([3; 33])]);
        assert_eq!(tallies[0].1, vec![plain(50), Commitment([4; 33])]);
    }

    #[test]
    fn test_anon_skips_tally() {
        let tx = typed(vec![input(9, ANON_MARKER)], vec![fee_output(50), anon(4), anon(5)]);
        let oracle = RecordingOracle::new(false);
        let outcome = run(&tx, &CoinSet::new(), 20, &oracle, ActivationFlags::default()).unwrap();
        assert_eq!(outcome, TxInputsOutcome { fee: 50, has_anon_input: true, has_anon_output: true });
        assert!(oracle.tallies.borrow().is_empty());
    }

    #[test]
    fn test_coinstake_reward() {
        let mut coins = CoinSet::new();
        coins.insert(OutPoint::new([1; 32], 0), Coin::standard(1000, vec![], 10));
        let mut tx = typed(vec![input(1, 0)], vec![standard(1200)]);
        tx.version = TYPED_TXN_VERSION | (2 << 8);

        let oracle = RecordingOracle::new(true);
        assert_eq!(run(&tx, &coins, 20, &oracle, ActivationFlags::default()).unwrap().fee, 200);

        tx.typed_outputs.push(blind(4));
        assert_eq!(code(run(&tx, &coins, 20, &oracle, ActivationFlags::default())), "bad-coinstake-output");
    }

    #[test]
    fn test_smsg_fee_enforcement() {
        let mut funding = vec![DO_FUND_MSG];
        let mut entry = vec![0u8; SMSG_FUND_ENTRY_SIZE];
        entry[20..24].copy_from_slice(&5000u32.to_le_bytes());
        funding.extend(entry);

        let mut coins = CoinSet::new();
        coins.insert(OutPoint::new([1; 32], 0), Coin::standard(100_000, vec![], 10));
        // Fee of 10000 covers the 5000 message fee but not the funding rate on top
        let tx = typed(
            vec![input(1, 0)],
            vec![standard(90_000), TypedOutput::Data { data: funding }],
        );

        let oracle = RecordingOracle::new(true);
        let enforcing = ActivationFlags { enforce_smsg_fees: true, ..Default::default() };
        let err = run(&tx, &coins, 20, &oracle, enforcing).unwrap_err();
        assert_eq!(err.code, "bad-txns-fee-smsg");

        let lenient = ActivationFlags::default();
        assert_eq!(run(&tx, &coins, 20, &oracle, lenient).unwrap().fee, 10_000);
    }
}
