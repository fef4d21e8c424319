//! Page bodies

use super::{escape, format_cents, layout};
use crate::models::{CallRecord, License, Product, Sale};

fn flags(refunded: bool, disputed: bool, chargebacked: bool) -> String {
    let mut labels = Vec::new();
    if refunded {
        labels.push("refunded");
    }
    if disputed {
        labels.push("disputed");
    }
    if chargebacked {
        labels.push("chargebacked");
    }
    if labels.is_empty() {
        "<span class=\"ok\">active</span>".to_string()
    } else {
        format!("<span class=\"warn\">{}</span>", labels.join(", "))
    }
}

/// Product catalog
pub fn products_page(products: &[Product]) -> String {
    let content = if products.is_empty() {
        "<p class=\"empty\">No products found.</p>".to_string()
    } else {
        let rows: String = products
            .iter()
            .enumerate()
            .map(|(index, product)| {
                format!(
                    "<tr><td>{name}</td><td>{price}</td><td>{description}</td>\
                     <td><a href=\"/licenses/{index}\">Licenses</a> \
                     <a href=\"/sales/{index}\">Sales</a></td></tr>\n",
                    name = escape(&product.name),
                    price = format_cents(product.price),
                    description = escape(product.description.as_deref().unwrap_or("")),
                    index = index,
                )
            })
            .collect();
        format!(
            "<table>\n<thead><tr><th>Name</th><th>Price</th><th>Description</th><th></th></tr></thead>\n\
             <tbody>\n{}</tbody>\n</table>",
            rows
        )
    };

    layout("Products", "products", None, &content)
}

/// License records of one product, with a validation button per key
pub fn licenses_page(product: &Product, licenses: &[License]) -> String {
    let content = if licenses.is_empty() {
        "<p class=\"empty\">No license keys found.</p>".to_string()
    } else {
        let rows: String = licenses
            .iter()
            .map(|license| {
                format!(
                    "<tr><td><code>{key}</code></td><td>{email}</td><td>{date}</td><td>{status}</td>\
                     <td><button class=\"validate\" data-product-id=\"{product_id}\" \
                     data-license-key=\"{key}\">Validate</button>\
                     <span class=\"result\"></span></td></tr>\n",
                    key = escape(&license.license_key),
                    email = escape(&license.purchaser_email),
                    date = escape(&license.sale_datetime),
                    status = flags(license.refunded, license.disputed, license.chargebacked),
                    product_id = escape(&product.id),
                )
            })
            .collect();
        format!(
            "<table>\n<thead><tr><th>License key</th><th>Purchaser</th><th>Sold</th><th>Status</th><th></th></tr></thead>\n\
             <tbody>\n{}</tbody>\n</table>",
            rows
        )
    };

    layout(
        &format!("License Keys - {}", product.name),
        "licenses",
        Some("/"),
        &content,
    )
}

/// Sales of one product
pub fn sales_page(product: &Product, sales: &[Sale]) -> String {
    let content = if sales.is_empty() {
        "<p class=\"empty\">No sales found.</p>".to_string()
    } else {
        let rows: String = sales
            .iter()
            .map(|sale| {
                format!(
                    "<tr><td>{email}</td><td>{price} {currency}</td><td>{quantity}</td>\
                     <td>{created}</td><td><code>{key}</code></td><td>{status}</td></tr>\n",
                    email = escape(&sale.email),
                    price = format_cents(sale.price),
                    currency = escape(&sale.currency),
                    quantity = sale.quantity,
                    created = escape(&sale.created_at),
                    key = escape(&sale.license_key),
                    status = flags(sale.refunded, sale.disputed, sale.chargebacked),
                )
            })
            .collect();
        format!(
            "<table>\n<thead><tr><th>Email</th><th>Price</th><th>Qty</th><th>Created</th>\
             <th>License key</th><th>Status</th></tr></thead>\n<tbody>\n{}</tbody>\n</table>",
            rows
        )
    };

    layout(&format!("Sales - {}", product.name), "sales", Some("/"), &content)
}

/// Call history table; `calls` is expected newest first
pub fn api_log_page(calls: &[CallRecord], back_link: &str) -> String {
    let content = if calls.is_empty() {
        "<p class=\"empty\">No API calls recorded yet.</p>".to_string()
    } else {
        let rows: String = calls
            .iter()
            .enumerate()
            .map(|(index, call)| {
                let status_class = match call.status {
                    0 => "error",
                    200..=299 => "ok",
                    _ => "warn",
                };
                format!(
                    "<tr><td>{time}</td><td>{method}</td><td class=\"url\">{url}</td>\
                     <td class=\"{status_class}\">{status}</td><td>{ms} ms</td><td>{error}</td>\
                     <td><button class=\"details\" data-index=\"{index}\">Details</button></td></tr>\n",
                    time = call.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    method = escape(&call.method),
                    url = escape(&call.url),
                    status_class = status_class,
                    status = call.status,
                    ms = call.duration_ms(),
                    error = escape(&call.error),
                    index = index,
                )
            })
            .collect();
        format!(
            "<p>{count} most recent calls, newest first.</p>\n<table>\n<thead><tr><th>Time</th><th>Method</th>\
             <th>URL</th><th>Status</th><th>Duration</th><th>Error</th><th></th></tr></thead>\n\
             <tbody>\n{rows}</tbody>\n</table>\n\
             <div id=\"call-modal\" class=\"modal\" hidden><div class=\"modal-body\">\
             <button class=\"close\">&times;</button><pre id=\"call-detail\"></pre></div></div>",
            count = calls.len(),
            rows = rows,
        )
    };

    layout("API Call Log", "api-log", Some(back_link), &content)
}

/// Token setup form
pub fn setup_page() -> String {
    let content = r#"<p>Enter a Gumroad access token to connect the dashboard.</p>
<form id="setup-form">
<label for="token">Access token</label>
<input id="token" name="token" type="password" autocomplete="off" required>
<button type="submit">Save token</button>
</form>
<p id="setup-result"></p>"#;

    layout("Setup - Gumroad Token", "setup", None, content)
}
