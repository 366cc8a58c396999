//! Server-side HTML for the dashboard pages.

use serde_json::Value;
use std::time::Duration;

use crate::backend_client::to_query;
use crate::config::PAGE_SIZES;
use crate::format::{
    badge_class, escape_html, format_maybe_number, format_money, format_rupiah,
    format_timestamp, or_dash, pretty_json, sorted_breakdown, DASH,
};
use crate::models::{Customer, CustomerProfile, SyncHealth};
use crate::views::customers::{
    ListFilters, ListPhase, ListSnapshot, SortBy, SortOrder, GENDER_OPTIONS, SEGMENT_OPTIONS,
    STATUS_OPTIONS,
};
use crate::views::dashboard::{DashboardData, DashboardState};
use crate::views::profile::{ProfileState, ProfileSummary, ProfileTab};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f6f8; color: #1d2330; }
.container { max-width: 1280px; margin: 0 auto; padding: 16px 24px; }
.header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 16px; }
.title { font-size: 20px; font-weight: 700; }
.subtitle, .muted { color: #6b7280; font-size: 13px; }
.nav a { margin-left: 16px; }
.card { background: #fff; border-radius: 8px; padding: 16px; margin-bottom: 12px; box-shadow: 0 1px 2px rgba(0,0,0,.08); }
.cardError, .error { border-left: 4px solid #dc2626; }
.error { background: #fff1f1; padding: 12px; margin: 12px 0; }
.grid2, .grid3, .grid4 { display: grid; gap: 12px; }
.grid2 { grid-template-columns: repeat(2, 1fr); }
.grid3 { grid-template-columns: repeat(3, 1fr); }
.grid4 { grid-template-columns: repeat(4, 1fr); }
.mono { font-family: ui-monospace, monospace; }
.chip { background: #eef2ff; border-radius: 12px; padding: 2px 8px; margin-right: 4px; }
.badge { border-radius: 12px; padding: 2px 10px; font-size: 12px; }
.badge-ok { background: #dcfce7; } .badge-warn { background: #fef9c3; } .badge-bad { background: #fee2e2; }
.tab { padding: 6px 12px; margin-right: 4px; } .tab.active { font-weight: 700; border-bottom: 2px solid #4f46e5; }
.btn.disabled { color: #9ca3af; pointer-events: none; }
table { width: 100%; border-collapse: collapse; } th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid #eee; }
pre.json { background: #0f172a; color: #e2e8f0; padding: 12px; overflow: auto; }
"#;

fn esc(text: &str) -> String {
    escape_html(text)
}

fn field(value: &Option<String>) -> String {
    esc(or_dash(value.as_deref()))
}

/// Wraps page content in the shared header and navigation.
pub fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} - Customer Profile 360</title>
<style>{STYLE}</style>
</head>
<body>
<div class="container">
<header class="header">
<div>
<div class="title">Customer Profile 360 - MKS Finance</div>
<div class="subtitle">Near Real-time Data Synchronization &amp; Profile Access</div>
</div>
<nav class="nav"><a href="/dashboard">Dashboard</a><a href="/customers">Customers</a></nav>
</header>
{body}
</div>
</body>
</html>"#,
        title = esc(title),
    )
}

pub fn not_found_page() -> String {
    layout("Not found", "<div>404 page not found</div>")
}

fn error_block(message: &str, hint_label: &str, command: &str) -> String {
    format!(
        r#"<div class="error"><b>Error:</b> {}<div class="hint">{}<pre>{}</pre></div></div>"#,
        esc(message),
        esc(hint_label),
        esc(command)
    )
}

// ============ Dashboard ============

fn kpi_card(title: &str, rows: &[(&str, Option<&Value>)]) -> String {
    let tiles: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<div class="kpiTile"><div class="kpiValue">{}</div><div class="muted kpiLabel">{}</div></div>"#,
                esc(&format_maybe_number(*value)),
                esc(label)
            )
        })
        .collect();
    format!(
        r#"<section class="card kpiCard"><div class="cardTitle">{}</div><div class="kpiGrid">{}</div></section>"#,
        esc(title),
        tiles
    )
}

fn key_value_list(title: &str, data: &serde_json::Map<String, Value>) -> String {
    let entries = sorted_breakdown(data);
    let body = if entries.is_empty() {
        r#"<div class="muted mt8">No data</div>"#.to_string()
    } else {
        let items: String = entries
            .iter()
            .map(|(k, v)| {
                format!(
                    r#"<div class="kvItem"><div class="kvKey">{}</div><div class="kvVal">{}</div></div>"#,
                    esc(k),
                    esc(&format_maybe_number(Some(v)))
                )
            })
            .collect();
        format!(r#"<div class="kvList">{}</div>"#, items)
    };
    format!(
        r#"<section class="card"><div class="cardTitle">{}</div>{}</section>"#,
        esc(title),
        body
    )
}

fn sync_banner(sync: &SyncHealth) -> String {
    let sla = format_maybe_number(sync.sla_target_seconds.as_ref());
    let metric = |label: &str, value: &str| {
        format!(
            r#"<div class="syncMetric"><div class="syncMetricLabel">{}</div><div class="syncMetricValue">{}</div></div>"#,
            esc(label),
            esc(value)
        )
    };
    format!(
        r#"<section class="card banner syncSection">
<div class="syncTitleRow"><div class="bannerTitle">Sync Health</div> <span class="{badge}">{status}</span></div>
<div class="muted">POC evidence (SLA target &le; {sla}s)</div>
<div class="grid4 syncGrid">{m1}{m2}{m3}{m4}</div>
</section>"#,
        badge = badge_class(sync.status_kind()),
        status = esc(sync.status.as_deref().filter(|s| !s.is_empty()).unwrap_or("unknown")),
        sla = esc(&sla),
        m1 = metric("SLA target (seconds)", &sla),
        m2 = metric(
            "Current lag (seconds)",
            &format_maybe_number(sync.lag_seconds.as_ref())
        ),
        m3 = metric(
            "Last success",
            &format_timestamp(sync.last_success_at.as_deref())
        ),
        m4 = metric(
            "Last error",
            sync.last_error.as_deref().filter(|s| !s.is_empty()).unwrap_or(DASH)
        ),
    )
}

fn dashboard_metrics(data: &DashboardData) -> String {
    let kpi = &data.kpi;
    format!(
        r#"<div class="grid3">{}{}{}</div><div class="grid2">{}{}</div>"#,
        kpi_card(
            "Customers",
            &[
                ("Total", kpi.customers.total.as_ref()),
                ("Active", kpi.customers.active.as_ref()),
            ]
        ),
        kpi_card(
            "Credit Applications",
            &[("Total", kpi.credit_applications.total.as_ref())]
        ),
        kpi_card(
            "Vehicle Ownership",
            &[("Total", kpi.vehicle_ownership.total.as_ref())]
        ),
        key_value_list("Customers by Segment", &kpi.customers.by_segment),
        key_value_list(
            "Credit Applications by Status",
            &kpi.credit_applications.by_status
        ),
    )
}

pub fn dashboard_page(state: &DashboardState) -> String {
    let mut body = String::from(
        r#"<div class="page"><div class="pageHeader"><h2>Dashboard</h2><div class="muted">Key metrics and data synchronization status</div></div>"#,
    );
    match state {
        DashboardState::Loading => body.push_str(r#"<div class="card">Loading dashboard…</div>"#),
        DashboardState::Error(message) => body.push_str(&format!(
            r#"<div class="card cardError"><div class="cardTitle">Dashboard error</div><pre class="json">{}</pre><div class="muted mt8">Also check the server log for details.</div></div>"#,
            esc(message)
        )),
        DashboardState::Loaded(data) => {
            body.push_str(&sync_banner(&data.sync));
            body.push_str(&dashboard_metrics(data));
        }
    }
    body.push_str("</div>");
    layout("Dashboard", &body)
}

// ============ Customers ============

/// Link to the list page with the current filters at `offset`.
pub fn customers_href(filters: &ListFilters, offset: u64) -> String {
    let mut query = filters.to_query();
    query.offset = offset;
    format!("/customers{}", to_query(query.pairs()))
}

pub fn profile_href(customer_id: &str) -> String {
    format!("/customers/{}", urlencoding::encode(customer_id))
}

fn select(name: &str, current: &str, options: &[(String, String)]) -> String {
    let opts: String = options
        .iter()
        .map(|(value, label)| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                esc(value),
                if value == current { " selected" } else { "" },
                esc(label)
            )
        })
        .collect();
    format!(r#"<select class="select" name="{}">{}</select>"#, name, opts)
}

fn filter_options(all_label: &str, options: &[&str]) -> Vec<(String, String)> {
    std::iter::once((String::new(), all_label.to_string()))
        .chain(options.iter().map(|o| (o.to_string(), o.to_string())))
        .collect()
}

fn customer_row(c: &Customer) -> String {
    let (id_cell, action) = match c.customer_id.as_deref() {
        Some(id) => (
            esc(id),
            format!(
                r#"<a class="linkBtn" href="{}">View 360</a>"#,
                esc(&profile_href(id))
            ),
        ),
        None => (DASH.to_string(), DASH.to_string()),
    };
    format!(
        r#"<tr><td class="mono">{}</td><td class="nameCell">{}</td><td>{}</td><td>{}</td><td><span class="chip">{}</span></td><td>{}</td><td class="mono">{}</td><td class="actionCell">{}</td></tr>"#,
        id_cell,
        field(&c.full_name),
        field(&c.gender),
        field(&c.city),
        field(&c.customer_segment),
        field(&c.status),
        field(&c.last_updated),
        action
    )
}

pub fn customers_page(snap: &ListSnapshot, api_base: &str, debounce: Duration) -> String {
    let filters = &snap.filters;
    let loading = snap.is_loading();

    let page_sizes: Vec<(String, String)> = PAGE_SIZES
        .iter()
        .map(|n| (n.to_string(), format!("{} / page", n)))
        .collect();
    let sort_options: Vec<(String, String)> = SortBy::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), s.label().to_string()))
        .collect();
    let order_options = vec![
        (SortOrder::Desc.as_str().to_string(), "Desc".to_string()),
        (SortOrder::Asc.as_str().to_string(), "Asc".to_string()),
    ];

    let prev = if filters.can_prev() && !loading {
        format!(
            r#"<a class="btn" href="{}">Prev</a>"#,
            esc(&customers_href(filters, filters.prev_offset()))
        )
    } else {
        r#"<span class="btn disabled">Prev</span>"#.to_string()
    };
    let next = format!(
        r#"<a class="btn" href="{}">Next</a>"#,
        esc(&customers_href(filters, filters.next_offset()))
    );

    let error = match &snap.phase {
        ListPhase::Error(message) => error_block(
            message,
            "Verify:",
            &format!(
                r#"curl -s "{}/api/v1/customers?limit=1&offset=0" | jq"#,
                api_base
            ),
        ),
        _ => String::new(),
    };

    let rows = if loading {
        r#"<tr><td colspan="8">Loading...</td></tr>"#.to_string()
    } else if snap.rows.is_empty() {
        r#"<tr><td colspan="8">No data</td></tr>"#.to_string()
    } else {
        snap.rows.iter().map(customer_row).collect()
    };

    let body = format!(
        r#"<div class="page pageWide">
<div class="pageHeader"><h2>Customers</h2><div class="muted">Search and browse customer records, then open the 360° profile view for complete details.</div>
<div class="inline">{prev} {next}</div></div>
<section class="card">
<form id="filters" class="filters" method="get" action="/customers">
<input class="input" type="search" name="q" placeholder="Search by customer ID, name, or NIK" value="{q}">
{status}{gender}{segment}{sort_by}{order}{limit}
<noscript><button class="btn" type="submit">Apply</button></noscript>
<div class="right muted">{showing}</div>
</form>
{error}
<div class="tableWrap"><table class="customersTable">
<thead><tr><th>Customer ID</th><th>Full Name</th><th>Gender</th><th>City</th><th>Segment</th><th>Status</th><th>Last Updated (UTC)</th><th>Action</th></tr></thead>
<tbody>{rows}</tbody>
</table></div>
</section>
</div>
<script>
(function () {{
  var form = document.getElementById("filters");
  var timer;
  form.querySelector("input[name=q]").addEventListener("input", function () {{
    clearTimeout(timer);
    timer = setTimeout(function () {{ form.submit(); }}, {debounce_ms});
  }});
  form.querySelectorAll("select").forEach(function (el) {{
    el.addEventListener("change", function () {{ form.submit(); }});
  }});
}})();
</script>"#,
        prev = prev,
        next = next,
        q = esc(&snap.search_input),
        status = select(
            "status",
            &filters.status,
            &filter_options("All Status", &STATUS_OPTIONS)
        ),
        gender = select(
            "gender",
            &filters.gender,
            &filter_options("All Gender", &GENDER_OPTIONS)
        ),
        segment = select(
            "segment",
            &filters.segment,
            &filter_options("All Segment", &SEGMENT_OPTIONS)
        ),
        sort_by = select("sort_by", filters.sort_by.as_str(), &sort_options),
        order = select("order", filters.order.as_str(), &order_options),
        limit = select("limit", &filters.limit.to_string(), &page_sizes),
        showing = esc(&snap.showing_text()),
        error = error,
        rows = rows,
        debounce_ms = debounce.as_millis(),
    );
    layout("Customers", &body)
}

// ============ Customer 360 ============

fn kv_row(key: &str, value: &str, mono: bool) -> String {
    format!(
        r#"<div class="kvRow"><div class="kvKey">{}</div><div class="kvVal{}">{}</div></div>"#,
        esc(key),
        if mono { " mono" } else { "" },
        value
    )
}

fn summary_cards(profile: &CustomerProfile, summary: &ProfileSummary) -> String {
    let empty = Customer::default();
    let c = profile.customer.as_ref().unwrap_or(&empty);
    format!(
        r#"<div class="grid4">
<section class="card"><div class="cardTitle">Customer</div><div class="bigText">{name}</div><div class="muted">{city}, {province}</div>
<div class="chips"><span class="chip">Segment: <b>{segment}</b></span><span class="chip">Status: <b>{status}</b></span><span class="chip">Gender: <b>{gender}</b></span></div></section>
<section class="card"><div class="cardTitle">Credit Apps</div><div class="bigNumber">{apps}</div><div class="muted">Approved: <b>{approved}</b> | In Review: <b>{in_review}</b></div></section>
<section class="card"><div class="cardTitle">Outstanding</div><div class="bigText">{outstanding}</div><div class="muted">Total outstanding amount across all credit applications</div></section>
<section class="card"><div class="cardTitle">Vehicles</div><div class="bigNumber">{vehicles}</div><div class="muted">Vehicle ownership records</div></section>
</div>"#,
        name = field(&c.full_name),
        city = field(&c.city),
        province = field(&c.province),
        segment = field(&c.customer_segment),
        status = field(&c.status),
        gender = field(&c.gender),
        apps = summary.total_applications,
        approved = summary.approved,
        in_review = summary.in_review,
        outstanding = esc(&format_rupiah(summary.total_outstanding)),
        vehicles = summary.vehicles,
    )
}

fn summary_tab(profile: &CustomerProfile) -> String {
    let empty = Customer::default();
    let c = profile.customer.as_ref().unwrap_or(&empty);
    let identity = [
        kv_row("NIK", &field(&c.nik), true),
        kv_row("DOB", &field(&c.date_of_birth), true),
        kv_row("Phone", &field(&c.phone_number), false),
        kv_row("Email", &field(&c.email), false),
        kv_row("Address", &field(&c.address), false),
    ]
    .concat();
    let employment = [
        kv_row("Occupation", &field(&c.occupation), false),
        kv_row("Employer", &field(&c.employer_name), false),
        kv_row(
            "Monthly Income",
            &esc(&format_money(c.monthly_income.as_ref())),
            false,
        ),
        kv_row("Credit Score", &field(&c.credit_score), true),
        kv_row("Last Updated", &field(&c.last_updated), true),
    ]
    .concat();
    format!(
        r#"<div class="grid2"><div><h3>Identity &amp; Contact</h3><div class="kv">{}</div></div><div><h3>Employment &amp; Score</h3><div class="kv">{}</div></div></div>"#,
        identity, employment
    )
}

fn applications_tab(profile: &CustomerProfile) -> String {
    let rows: String = if profile.credit_applications.is_empty() {
        r#"<tr><td colspan="7">No credit applications</td></tr>"#.to_string()
    } else {
        profile
            .credit_applications
            .iter()
            .map(|a| {
                format!(
                    r#"<tr><td class="mono">{}</td><td><span class="chip">{}</span></td><td>{} {} ({})</td><td>{}</td><td>{}</td><td class="mono">{}</td><td class="mono">{}</td></tr>"#,
                    field(&a.application_id),
                    field(&a.application_status),
                    field(&a.vehicle_brand),
                    field(&a.vehicle_model),
                    field(&a.vehicle_year),
                    esc(&format_money(a.loan_amount.as_ref())),
                    esc(&format_money(a.outstanding_amount.as_ref())),
                    field(&a.tenor_months),
                    field(&a.interest_rate),
                )
            })
            .collect()
    };
    format!(
        r#"<div class="tableWrap"><table><thead><tr><th>Application ID</th><th>Status</th><th>Vehicle</th><th>Loan Amount</th><th>Outstanding</th><th>Tenor</th><th>Interest</th></tr></thead><tbody>{}</tbody></table></div>"#,
        rows
    )
}

fn vehicles_tab(profile: &CustomerProfile) -> String {
    let rows: String = if profile.vehicle_ownership.is_empty() {
        r#"<tr><td colspan="5">No vehicle ownership</td></tr>"#.to_string()
    } else {
        profile
            .vehicle_ownership
            .iter()
            .map(|v| {
                format!(
                    r#"<tr><td class="mono">{}</td><td>{}</td><td>{} / {}</td><td class="mono">{}</td><td>{}</td></tr>"#,
                    field(&v.ownership_id),
                    field(&v.vehicle_type),
                    field(&v.brand),
                    field(&v.model),
                    field(&v.year),
                    field(&v.ownership_status),
                )
            })
            .collect()
    };
    format!(
        r#"<div class="tableWrap"><table><thead><tr><th>Ownership ID</th><th>Type</th><th>Brand/Model</th><th>Year</th><th>Status</th></tr></thead><tbody>{}</tbody></table></div>"#,
        rows
    )
}

fn profile_tabs(customer_id: &str, profile: &CustomerProfile, active: ProfileTab) -> String {
    let base = profile_href(customer_id);
    let tabs: String = ProfileTab::ALL
        .iter()
        .map(|tab| {
            format!(
                r#"<a class="{}" href="{}?tab={}">{}</a>"#,
                if *tab == active { "tab active" } else { "tab" },
                esc(&base),
                tab.key(),
                esc(&tab.label(profile))
            )
        })
        .collect();
    let content = match active {
        ProfileTab::Summary => summary_tab(profile),
        ProfileTab::Applications => applications_tab(profile),
        ProfileTab::Vehicles => vehicles_tab(profile),
        ProfileTab::Raw => format!(r#"<pre class="json">{}</pre>"#, esc(&pretty_json(&profile.raw))),
    };
    format!(
        r#"<section class="card"><div class="tabs">{}</div>{}</section>"#,
        tabs, content
    )
}

pub fn profile_page(
    customer_id: &str,
    state: &ProfileState,
    tab: ProfileTab,
    api_base: &str,
) -> String {
    let mut body = format!(
        r#"<div class="page"><div class="pageHeader"><div><h2>Customer 360</h2><div class="muted">customer_id: <span class="mono">{}</span></div></div><a class="btn" href="/customers">← Back</a></div>"#,
        esc(customer_id)
    );

    if let ProfileState::Error(message) = state {
        body.push_str(&error_block(
            message,
            "Test backend:",
            &format!(
                r#"curl -s "{}/api/v1/customers/{}/profile" | jq"#,
                api_base, customer_id
            ),
        ));
    }

    match state {
        ProfileState::Loading => body.push_str(r#"<div class="card">Loading...</div>"#),
        ProfileState::Error(_) | ProfileState::Empty => {
            body.push_str(r#"<div class="card">No data</div>"#)
        }
        ProfileState::Loaded(profile) => {
            let summary = ProfileSummary::of(profile);
            body.push_str(&summary_cards(profile, &summary));
            body.push_str(&profile_tabs(customer_id, profile, tab));
        }
    }

    body.push_str("</div>");
    layout("Customer 360", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::customers::PageMeta;
    use serde_json::json;

    #[test]
    fn test_customers_href_keeps_filters() {
        let mut filters = ListFilters::default();
        filters.segment = "Gold".into();
        filters.q = "budi santoso".into();
        assert_eq!(
            customers_href(&filters, 40),
            "/customers?limit=20&offset=40&q=budi+santoso&segment=Gold&sort_by=last_updated&order=desc"
        );
    }

    #[test]
    fn test_profile_href_encodes_id() {
        assert_eq!(profile_href("C/1 2"), "/customers/C%2F1%202");
    }

    #[test]
    fn test_customers_page_escapes_cells() {
        let mut snap = ListSnapshot::new(ListFilters::default());
        snap.rows = vec![Customer {
            customer_id: Some("C-1".into()),
            full_name: Some("<script>alert(1)</script>".into()),
            ..Default::default()
        }];
        snap.phase = ListPhase::Loaded;
        snap.meta = PageMeta {
            limit: 20,
            offset: 0,
            total: Some(1),
        };

        let html = customers_page(&snap, "http://localhost:8080", Duration::from_millis(350));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("Showing 1–1 of 1"));
        assert!(html.contains(r#"href="/customers/C-1""#));
        assert!(html.contains("setTimeout(function () { form.submit(); }, 350)"));
    }

    #[test]
    fn test_profile_page_tabs() {
        let profile = CustomerProfile::from_value(json!({
            "customer": {"customer_id": "C-9", "full_name": "Ani"},
            "credit_applications": [{"application_id": "A-1", "application_status": "Approved", "outstanding_amount": 2000000}],
            "vehicle_ownership": []
        }));
        let state = ProfileState::Loaded(Box::new(profile));

        let html = profile_page("C-9", &state, ProfileTab::Applications, "http://localhost:8080");
        assert!(html.contains("Credit Apps (1)"));
        assert!(html.contains("Vehicles (0)"));
        assert!(html.contains("Rp 2.000.000"));
        assert!(html.contains(r#"class="tab active" href="/customers/C-9?tab=applications""#));

        let html = profile_page("C-9", &state, ProfileTab::Raw, "http://localhost:8080");
        assert!(html.contains("&quot;full_name&quot;: &quot;Ani&quot;"));
    }

    #[test]
    fn test_dashboard_page_badge() {
        let data = DashboardData {
            kpi: Default::default(),
            sync: SyncHealth {
                status: Some("warn".into()),
                last_error: None,
                ..Default::default()
            },
        };
        let html = dashboard_page(&DashboardState::Loaded(Box::new(data)));
        assert!(html.contains(r#"<span class="badge badge-warn">warn</span>"#));
        assert!(html.contains("Customers by Segment"));
        assert!(html.contains("No data"));
    }
}
