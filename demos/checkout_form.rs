//! Example: Building an MPG checkout form and decoding a notification.
//!
//! Run with: cargo run --example checkout_form

use newebpay_mpg::models::Installments;
use newebpay_mpg::{Credentials, Mpg, TradeInfo};

fn main() -> anyhow::Result<()> {
    // Initialize tracing for debug output (optional)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Sandbox-style credentials; use the values from the merchant console
    let credentials = Credentials::new(
        "MS123456",
        "12345678901234567890123456789012",
        "1234567890123456",
    );

    let mpg = Mpg::builder(credentials)
        // Switch to the live gateway:
        // .production()
        .build()?;

    let info = TradeInfo::builder("MS123456", "ORDER_20240101_001", 1500, "Test item")
        .email("payer@example.com")
        .notify_url("https://shop.example.com/newebpay/notify")
        .return_url("https://shop.example.com/newebpay/return")
        .credit(true)
        .installments(Installments::Periods(vec![3, 6]))
        .build()?;

    let payload = mpg.build_payload(&info)?;
    println!("MerchantID: {}", payload.merchant_id);
    println!("TradeInfo:  {}...", &payload.trade_info[..32.min(payload.trade_info.len())]);
    println!("TradeSha:   {}", payload.trade_sha);
    println!();
    println!("{}", mpg.render_form(&payload));

    // What the gateway would post back to NotifyURL
    let body = "Status=SUCCESS&Message=OK&MerchantID=MS123456&Amt=1500\
                &TradeNo=24010112000012345&MerchantOrderNo=ORDER_20240101_001&PaymentType=CREDIT";
    let trade_info = newebpay_mpg::crypto::encrypt_aes_cbc(
        body,
        mpg.credentials().hash_key(),
        mpg.credentials().hash_iv(),
    )?;
    let trade_sha = mpg.trade_sha(&trade_info);

    match mpg.decode_notification(&trade_info, &trade_sha) {
        Ok(notification) => {
            println!("\nNotification status: {}", notification.status);
            if let Some(result) = notification.result {
                println!("  order: {}", result.merchant_order_no);
                println!("  amount: {}", result.amount);
                println!("  trade_no: {}", result.trade_no);
            }
        }
        Err(e) => {
            println!("Failed: {}", e);
        }
    }

    Ok(())
}
