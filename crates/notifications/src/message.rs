//! Outbound message formatting.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use uniasia_inventory::{ExpiringItem, Quantity, StockReading, Threshold};

const BRAND: &str = "UNIASIA";

/// A rendered email, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// One product row in a low-stock message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockLine {
    pub product_name: String,
    pub quantity: Quantity,
}

impl From<&StockReading> for LowStockLine {
    fn from(reading: &StockReading) -> Self {
        Self {
            product_name: reading.product_name().to_string(),
            quantity: reading.current(),
        }
    }
}

/// One batch row in an expiring-items message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiringLine {
    pub product_name: String,
    pub quantity: Quantity,
    pub expires_on: NaiveDate,
    pub days_remaining: i64,
}

impl ExpiringLine {
    pub fn from_item(item: &ExpiringItem, today: NaiveDate) -> Self {
        Self {
            product_name: item.product_name().to_string(),
            quantity: item.quantity(),
            expires_on: item.expires_on(),
            days_remaining: item.days_remaining(today),
        }
    }

    fn describe(&self) -> String {
        match self.days_remaining {
            d if d < 0 => format!("expired {} day(s) ago", -d),
            0 => "expires today".to_string(),
            d => format!("expires in {d} day(s)"),
        }
    }
}

impl OutboundMessage {
    /// Alert for a single product that just went low.
    pub fn low_stock(product_name: &str, quantity: Quantity, threshold: Threshold) -> Self {
        let subject = format!("[{BRAND}] Low stock alert: {product_name}");
        let text = format!(
            "{product_name} is running low.\n\
             Current quantity: {quantity}\n\
             Low-stock threshold: {threshold}\n\n\
             Please arrange a restock."
        );
        let html = format!(
            "<h2>Low stock alert</h2>\
             <p><strong>{name}</strong> is running low.</p>\
             <ul><li>Current quantity: {quantity}</li><li>Low-stock threshold: {threshold}</li></ul>\
             <p>Please arrange a restock.</p>",
            name = escape_html(product_name),
        );
        Self { subject, text, html }
    }

    /// One message listing every product that went low in a batch.
    pub fn low_stock_digest(lines: &[LowStockLine], threshold: Threshold) -> Self {
        let subject = format!("[{BRAND}] Low stock alert: {} product(s)", lines.len());

        let mut text = format!("The following products are at or below the threshold of {threshold}:\n\n");
        let mut rows = String::new();
        for line in lines {
            text.push_str(&format!("- {}: {}\n", line.product_name, line.quantity));
            rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(&line.product_name),
                line.quantity
            ));
        }
        text.push_str("\nPlease arrange a restock.");

        let html = format!(
            "<h2>Low stock alert</h2>\
             <p>The following products are at or below the threshold of {threshold}:</p>\
             <table><thead><tr><th>Product</th><th>Quantity</th></tr></thead><tbody>{rows}</tbody></table>\
             <p>Please arrange a restock.</p>"
        );
        Self { subject, text, html }
    }

    /// One message listing batches that expire soon (or already did).
    pub fn expiring_items(lines: &[ExpiringLine]) -> Self {
        let subject = format!("[{BRAND}] Expiring stock: {} item(s)", lines.len());

        let mut text = String::from("The following stock is expiring soon:\n\n");
        let mut rows = String::new();
        for line in lines {
            text.push_str(&format!(
                "- {} (qty {}): {} on {}\n",
                line.product_name,
                line.quantity,
                line.describe(),
                line.expires_on
            ));
            rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&line.product_name),
                line.quantity,
                line.expires_on,
                line.describe()
            ));
        }

        let html = format!(
            "<h2>Expiring stock</h2>\
             <table><thead><tr><th>Product</th><th>Quantity</th><th>Expiry date</th><th>Status</th></tr></thead>\
             <tbody>{rows}</tbody></table>"
        );
        Self { subject, text, html }
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
