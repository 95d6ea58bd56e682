//! The main statistics page.

use builder_ledger::CachedTrades;
use builder_ledger::stats::{BuilderSummary, DashboardStats, TokenTotals};
use indexmap::IndexMap;
use std::fmt::Write;

use super::{amount, count, escape_html, freshness, layout, sign_class, usd};

pub fn dashboard_page(stats: &DashboardStats, cached: &CachedTrades) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<h1>Block Builder DEX Activity</h1>\n");
    html.push_str(&freshness(cached.fetched_at, cached.age, cached.stale));

    overview(&mut html, stats);
    builders(&mut html, &stats.builder_summary);
    top_addresses(&mut html, stats);
    breakdowns(&mut html, stats);

    layout("Builder Dashboard", &html)
}

fn card(html: &mut String, label: &str, value: &str) {
    let _ = write!(
        html,
        r#"<div class="card"><div class="label">{}</div><div class="value">{}</div></div>"#,
        label,
        escape_html(value)
    );
}

fn overview(html: &mut String, stats: &DashboardStats) {
    html.push_str(r#"<div class="cards">"#);
    card(html, "Transactions", &count(stats.total_transactions));
    card(html, "Trade volume", &usd(stats.total_value_usd));
    card(html, "Unique addresses", &count(stats.unique_addresses_count));
    card(html, "Unique blocks", &count(stats.unique_blocks_count));
    card(html, "Balance increases", &count(stats.balance_changes.increases));
    card(html, "Balance decreases", &count(stats.balance_changes.decreases));
    html.push_str("</div>\n");

    if let (Some(earliest), Some(latest)) = (&stats.date_range.earliest, &stats.date_range.latest) {
        let _ = writeln!(
            html,
            r#"<p class="meta">Block times {} to {}</p>"#,
            escape_html(earliest),
            escape_html(latest)
        );
    }
}

fn token_table(html: &mut String, tokens: &IndexMap<String, TokenTotals>) {
    if tokens.is_empty() {
        return;
    }
    html.push_str(
        r#"<table><tr><th>Token</th><th class="num">Balance change</th><th class="num">Profit (USD)</th></tr>"#,
    );
    for (token, totals) in tokens {
        let _ = write!(
            html,
            r#"<tr><td>{}</td><td class="num {}">{}</td><td class="num {}">{}</td></tr>"#,
            escape_html(token),
            sign_class(totals.balance_change),
            amount(totals.balance_change),
            sign_class(totals.profit_usd),
            usd(totals.profit_usd)
        );
    }
    html.push_str("</table>");
}

fn builders(html: &mut String, builders: &[BuilderSummary]) {
    html.push_str("<h2>Builders</h2>\n");
    if builders.is_empty() {
        html.push_str(r#"<p class="meta">No trades involving tracked builders.</p>"#);
        return;
    }

    html.push_str(
        r#"<table><tr><th>Builder</th><th class="num">Profit (USD)</th><th class="num">Balance change</th><th class="num">Transactions</th><th class="num">Blocks</th></tr>"#,
    );
    for builder in builders {
        let address = escape_html(&builder.address);
        let _ = write!(
            html,
            r#"<tr><td><a href="/builder/{address}">{address}</a></td><td class="num {}">{}</td><td class="num {}">{}</td><td class="num">{}</td><td class="num">{}</td></tr>"#,
            sign_class(builder.total_profit_usd),
            usd(builder.total_profit_usd),
            sign_class(builder.total_balance_change),
            amount(builder.total_balance_change),
            count(builder.total_transactions),
            count(builder.total_blocks),
        );
    }
    html.push_str("</table>\n");

    for builder in builders {
        let _ = write!(html, "<details><summary>{} by block</summary>", escape_html(&builder.address));
        token_table(html, &builder.tokens);
        for block in &builder.blocks {
            let _ = write!(
                html,
                r#"<details><summary>Block {} &middot; {} &middot; {} txs &middot; <span class="{}">{}</span></summary>"#,
                escape_html(&block.block_number),
                escape_html(&block.block_time),
                block.transaction_count,
                sign_class(block.total_profit_usd),
                usd(block.total_profit_usd)
            );
            token_table(html, &block.tokens);
            html.push_str("</details>");
        }
        html.push_str("</details>\n");
    }
}

fn top_addresses(html: &mut String, stats: &DashboardStats) {
    html.push_str("<h2>Largest balance movements</h2>\n");
    html.push_str(
        r#"<table><tr><th>Address</th><th class="num">Entries</th><th class="num">Balance change</th></tr>"#,
    );
    for row in &stats.address_summary {
        let _ = write!(
            html,
            r#"<tr><td>{}</td><td class="num">{}</td><td class="num {}">{}</td></tr>"#,
            escape_html(&row.address),
            count(row.count),
            sign_class(row.total_balance_change),
            amount(row.total_balance_change)
        );
    }
    html.push_str("</table>\n");

    html.push_str("<h2>Most active addresses</h2>\n");
    html.push_str(r#"<table><tr><th>Address</th><th class="num">Entries</th></tr>"#);
    for row in &stats.transactions_by_address {
        let _ = write!(
            html,
            r#"<tr><td>{}</td><td class="num">{}</td></tr>"#,
            escape_html(&row.address),
            count(row.count)
        );
    }
    html.push_str("</table>\n");
}

fn breakdowns(html: &mut String, stats: &DashboardStats) {
    html.push_str("<h2>DEX protocols</h2>\n");
    html.push_str(r#"<table><tr><th>Protocol</th><th class="num">Trades</th></tr>"#);
    for row in &stats.dex_protocols {
        let _ = write!(
            html,
            r#"<tr><td>{}</td><td class="num">{}</td></tr>"#,
            escape_html(&row.protocol),
            count(row.count)
        );
    }
    html.push_str("</table>\n");

    if !stats.transactions_by_reason.is_empty() {
        html.push_str("<h2>Balance change reasons</h2>\n");
        html.push_str(r#"<table><tr><th>Reason code</th><th class="num">Entries</th></tr>"#);
        for (reason, n) in &stats.transactions_by_reason {
            let _ = write!(
                html,
                r#"<tr><td>{}</td><td class="num">{}</td></tr>"#,
                escape_html(reason),
                count(*n)
            );
        }
        html.push_str("</table>\n");
    }
}
