//! Trades for one builder address.

use builder_ledger::trade::TradeLeg;
use builder_ledger::{CachedTrades, ProjectedTrade};
use std::fmt::Write;

use super::{amount, escape_html, freshness, layout, short_hash, sign_class, usd};

fn leg(leg: &TradeLeg) -> String {
    format!(
        "{} {}<br><span class=\"meta\">{}</span>",
        amount(leg.amount),
        escape_html(&leg.currency.symbol),
        usd(leg.amount_usd)
    )
}

fn balance_changes(html: &mut String, trade: &ProjectedTrade) {
    if trade.balance_changes.is_empty() {
        return;
    }
    html.push_str(r#"<ul class="changes">"#);
    for change in &trade.balance_changes {
        let _ = write!(
            html,
            r#"<li>{}: <span class="{}">{}</span> ({} → {}), <span class="{}">{}</span>"#,
            escape_html(&change.currency.token_key()),
            sign_class(change.balance_change),
            amount(change.balance_change),
            amount(change.pre_balance),
            amount(change.post_balance),
            sign_class(change.profit_usd),
            usd(change.profit_usd)
        );
        if !change.reason_code.is_empty() {
            let _ = write!(html, r#" <span class="meta">reason {}</span>"#, escape_html(&change.reason_code));
        }
        html.push_str("</li>");
    }
    html.push_str("</ul>");
}

pub fn builder_page(address: &str, trades: &[ProjectedTrade], cached: &CachedTrades) -> String {
    let title = format!("Builder {}", address);
    let address = escape_html(address);
    let mut html = String::with_capacity(8 * 1024);

    let _ = writeln!(html, "<h1>Builder {}</h1>", address);
    html.push_str(&freshness(cached.fetched_at, cached.age, cached.stale));
    let _ = writeln!(html, r#"<p class="meta">{} trades in cached data</p>"#, trades.len());

    if trades.is_empty() {
        html.push_str(r#"<p>No trades for this address in the cached data.</p>"#);
        return layout(&title, &html);
    }

    html.push_str(
        r#"<table><tr><th>Block</th><th>Time</th><th>Transaction</th><th>DEX</th><th class="num">Buy</th><th class="num">Sell</th><th>Builder balance changes</th></tr>"#,
    );
    for trade in trades {
        let _ = write!(
            html,
            r#"<tr><td>{}</td><td>{}</td><td title="{}">{}</td><td>{}</td><td class="num">{}</td><td class="num">{}</td><td>"#,
            escape_html(&trade.block_number),
            escape_html(&trade.block_time),
            escape_html(&trade.tx_hash),
            escape_html(&short_hash(&trade.tx_hash)),
            escape_html(&trade.dex_protocol),
            leg(&trade.buy),
            leg(&trade.sell)
        );
        balance_changes(&mut html, trade);
        html.push_str("</td></tr>\n");
    }
    html.push_str("</table>\n");

    layout(&title, &html)
}
