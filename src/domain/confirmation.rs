use {
    super::{
        id::OrderId,
        money::MoneyAmount,
        notifier::EmailMessage,
        order::{Configuration, PostalAddress},
    },
    chrono::{DateTime, Utc},
    html_escape::encode_text,
};

pub const SUBJECT: &str = "Thanks for your order";

/// "Order received" email sent once an order is paid.
pub struct OrderConfirmation<'a> {
    pub order_id: &'a OrderId,
    /// When the order was fulfilled, not when checkout started.
    pub order_date: DateTime<Utc>,
    pub shipping: &'a PostalAddress,
    pub amount: MoneyAmount,
    pub configuration: &'a Configuration,
}

impl OrderConfirmation<'_> {
    pub fn formatted_date(&self) -> String {
        self.order_date.format("%b %d, %Y").to_string()
    }

    pub fn render(&self, from: &str, to: &str) -> EmailMessage {
        let date = self.formatted_date();
        let address = self.shipping.lines();
        let summary = self.configuration.summary();

        let text = format!(
            "Thank you for your order!\n\nWe're preparing everything for delivery and will notify you once your package has been shipped.\n\nOrder number: {}\nOrder date: {}\nTotal: {}\nItem: {}\n\nShipping to:\n{}\n\nPlease contact us if you have any questions.",
            self.order_id,
            date,
            self.amount,
            summary,
            address.join("\n"),
        );

        let address_html = address
            .iter()
            .map(|line| encode_text(line))
            .collect::<Vec<_>>()
            .join("<br>");
        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
<h2 style="color: #333;">Thank you for your order!</h2>
<p>We're preparing everything for delivery and will notify you once your package has been shipped.</p>
<p style="color: #666;">Shipping to:<br>{address_html}</p>
<hr style="border: none; border-top: 1px solid #eee; margin: 30px 0;">
<table style="font-size: 14px;">
<tr><td style="color: #666; padding-right: 16px;">Order number</td><td>{order_id}</td></tr>
<tr><td style="color: #666; padding-right: 16px;">Order date</td><td>{date}</td></tr>
<tr><td style="color: #666; padding-right: 16px;">Total</td><td>{amount}</td></tr>
<tr><td style="color: #666; padding-right: 16px;">Item</td><td>{summary}</td></tr>
</table>
<p style="color: #999; font-size: 12px;">Please contact us if you have any questions.</p>
</body>
</html>"#,
            order_id = encode_text(self.order_id.as_str()),
            amount = self.amount,
            summary = encode_text(&summary),
        );

        EmailMessage {
            from: from.to_string(),
            to: vec![to.to_string()],
            subject: SUBJECT.to_string(),
            text,
            html,
        }
    }
}
