//! LP Cover Core Simulation.
//!
//! Demonstrates the full insurance market lifecycle: market creation, the
//! seller order book, coverage purchase, the close-time price freeze, and
//! claim/refund settlement.

use lpcover_core::*;
use rust_decimal_macros::dec;

const VOL: AssetId = AssetId(1);
const USDX: AssetId = AssetId(2);
const LP: AssetId = AssetId(10);

const EXPIRY: Timestamp = Timestamp(1_000_000);

fn main() {
    println!("LP Cover Core Engine Simulation");
    println!("Single Market, Frozen Settlement Price, Full Lifecycle\n");

    scenario_1_order_book();
    scenario_2_coverage_purchase();
    scenario_3_loss_and_settlement();
    scenario_4_no_loss_expiry();

    println!("\nAll simulations completed successfully.");
}

/// Engine with one USDX-settled market over a VOL/USDX pool.
/// Pool: 100 VOL + 200,000 USDX, 1000 LP supply. VOL at 1 native, USDX at
/// 0.0005 native, so one LP token is worth 0.2 native = 400 USDX.
fn setup() -> (Engine, MarketId) {
    let mut engine = Engine::new(EngineConfig {
        stable_assets: vec![USDX],
        ..EngineConfig::default()
    });

    engine.set_native_price(VOL, Price::new_unchecked(dec!(1)));
    engine.set_native_price(USDX, Price::new_unchecked(dec!(0.0005)));
    engine
        .register_pool(LP, PoolSnapshot::new(VOL, USDX, dec!(100), dec!(200_000), dec!(1000)))
        .unwrap();

    let market_id = engine.add_market(LP, EXPIRY, dec!(80), dec!(10)).unwrap();
    (engine, market_id)
}

/// Sellers quote rates, amend, and cancel; escrow follows the book.
fn scenario_1_order_book() {
    println!("Scenario 1: Seller Order Book\n");

    let (mut engine, market_id) = setup();
    let seller = engine.create_account();
    engine.fund(seller, USDX, dec!(10_000));

    let a = engine.place_order(seller, market_id, Bps::new(100), dec!(3_000)).unwrap();
    let b = engine.place_order(seller, market_id, Bps::new(150), dec!(2_000)).unwrap();

    println!("  Seller offers 3,000 USDX at 100bps (order {:?})", a);
    println!("  Seller offers 2,000 USDX at 150bps (order {:?})", b);
    println!("  Escrowed: {} USDX", engine.vault_balance(USDX));

    engine.amend_order(seller, market_id, a, dec!(1_000)).unwrap();
    println!("  Order {:?} amended down to 1,000 USDX", a);

    engine.cancel_order(seller, market_id, b).unwrap();
    println!("  Order {:?} canceled", b);
    println!(
        "  Escrowed: {} USDX, seller balance: {} USDX\n",
        engine.vault_balance(USDX),
        engine.balance(USDX, seller)
    );
}

/// A buyer purchases coverage; premium flows seller-ward, LP stake escrows.
fn scenario_2_coverage_purchase() {
    println!("Scenario 2: Coverage Purchase\n");

    let (mut engine, market_id) = setup();
    let seller = engine.create_account();
    let buyer = engine.create_account();
    engine.fund(seller, USDX, dec!(5_000));
    engine.fund(buyer, USDX, dec!(100));
    engine.fund(buyer, LP, dec!(2));

    let order = engine.place_order(seller, market_id, Bps::new(100), dec!(1_000)).unwrap();
    println!("  Seller offers 1,000 USDX at 100bps");

    let receipt = engine.buy(buyer, market_id, seller, order, dec!(400), dec!(1)).unwrap();
    println!("  Buyer covers a 1 LP stake with 400 USDX of collateral");
    println!("  Premium paid: {} USDX", receipt.premium);
    println!("  Entry benchmark: {} USDX", receipt.lp_value);
    println!(
        "  Order remaining: {} USDX, LP escrowed: {}\n",
        engine.orders(market_id, seller)[0].amount,
        engine.vault_balance(LP)
    );
}

/// The volatile leg collapses; the buyer claims, the seller takes the rest.
fn scenario_3_loss_and_settlement() {
    println!("Scenario 3: Price Drop and Settlement\n");

    let (mut engine, market_id) = setup();
    let seller = engine.create_account();
    let buyer = engine.create_account();
    engine.fund(seller, USDX, dec!(5_000));
    engine.fund(buyer, USDX, dec!(100));
    engine.fund(buyer, LP, dec!(1));

    let order = engine.place_order(seller, market_id, Bps::new(100), dec!(1_000)).unwrap();
    let receipt = engine.buy(buyer, market_id, seller, order, dec!(300), dec!(1)).unwrap();
    println!("  Coverage: 300 USDX staked against a 1 LP position worth {}", receipt.lp_value);

    // VOL loses 75% of its native price before expiry
    engine.set_native_price(VOL, Price::new_unchecked(dec!(0.25)));
    engine.set_time(Timestamp::from_millis(EXPIRY.as_millis() + 1));

    let frozen = engine.close_market(market_id).unwrap();
    println!("  Market closed, settlement price frozen at {} USDX/LP", frozen);

    let resolution = engine.claim(buyer, market_id, receipt.buyer_index).unwrap();
    println!("  Loss: {} USDX, covered at 80%: {}", resolution.loss, resolution.covered_loss);
    println!(
        "  Payout: {} USDX to buyer, refund: {} USDX to seller, {} LP returned\n",
        resolution.payout, resolution.seller_refund, resolution.lp_returned
    );
}

/// No depreciation: payout is zero, the seller's stake comes back whole.
fn scenario_4_no_loss_expiry() {
    println!("Scenario 4: Expiry Without Loss\n");

    let (mut engine, market_id) = setup();
    let seller = engine.create_account();
    let buyer = engine.create_account();
    engine.fund(seller, USDX, dec!(5_000));
    engine.fund(buyer, USDX, dec!(100));
    engine.fund(buyer, LP, dec!(1));

    let order = engine.place_order(seller, market_id, Bps::new(100), dec!(1_000)).unwrap();
    let receipt = engine.buy(buyer, market_id, seller, order, dec!(300), dec!(1)).unwrap();

    engine.set_time(Timestamp::from_millis(EXPIRY.as_millis() + 1));

    let resolution = engine.refund(seller, market_id, receipt.seller_index).unwrap();
    println!("  Seller triggered settlement first");
    println!(
        "  Payout: {} USDX, refund: {} USDX, buyer got {} LP back",
        resolution.payout, resolution.seller_refund, resolution.lp_returned
    );

    let second = engine.claim(buyer, market_id, receipt.buyer_index);
    println!("  Buyer's later claim on the same policy: {:?}", second.err().map(|e| e.to_string()));
}
