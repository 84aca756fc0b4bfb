//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the storefront and exercise the
//! full crawl-and-resolve cycle end-to-end.

use catalog_harvest::config::{ClientConfig, Config, HeaderConfig, OutputConfig, SiteConfig};
use catalog_harvest::crawler::Harvester;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PATH: &str = "/dama/ropa-de-dama/abrigos.html";
const LOOKUP_PATH: &str = "/products/index/productstock";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, categories: &[&str], page_size: usize) -> Config {
    Config {
        store: "stevens".to_string(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        site: SiteConfig {
            listing_base_url: format!("{}/dama/ropa-de-dama/", base_url),
            lookup_url: format!("{}{}", base_url, LOOKUP_PATH),
            page_size,
            color_attribute_id: "277".to_string(),
            size_attribute_id: "617".to_string(),
            max_pages: None,
            product_link_selector: "a.product.photo.product-item-photo".to_string(),
            page_init_selector: "script[type='text/x-magento-init']".to_string(),
            schema_selector: "script[type='application/ld+json']".to_string(),
            swatch_marker: "data-role".to_string(),
        },
        client: ClientConfig {
            user_agent: "TestHarvest/1.0".to_string(),
            timeout_secs: 5,
            connect_timeout_secs: 2,
            max_concurrent_products: 8,
            max_concurrent_variants: 8,
        },
        headers: HeaderConfig::default(),
        output: OutputConfig {
            path: "./unused.json".to_string(),
            pretty: true,
        },
    }
}

fn product_url(base_url: &str, id: usize) -> String {
    format!("{}/p/{}.html", base_url, id)
}

fn listing_html(links: &[String]) -> String {
    let cards: String = links
        .iter()
        .map(|href| format!(r#"<a class="product photo product-item-photo" href="{}"></a>"#, href))
        .collect();
    format!("<html><body><div class=\"products\">{}</div></body></html>", cards)
}

fn product_html(sku: &str, colors: &[(&str, &str)], sizes: &[(&str, &str)]) -> String {
    let options = |list: &[(&str, &str)]| -> Value {
        list.iter()
            .map(|(id, label)| json!({"id": id, "label": label}))
            .collect()
    };
    let init = json!({
        "[data-role=swatch-options]": {
            "Magento_Swatches/js/swatch-renderer": {
                "jsonConfig": {
                    "productId": "9001",
                    "images": {},
                    "optionPrices": {"9002": {"finalPrice": {"amount": 49.95}}},
                    "attributes": {
                        "277": {"options": options(colors)},
                        "617": {"options": options(sizes)}
                    }
                }
            }
        }
    });

    format!(
        r#"<html><head>
        <script type="application/ld+json">{{"@type": "Product", "sku": "{}"}}</script>
        </head><body>
        <script type="text/x-magento-init">{{"*": {{"Magento_Ui/js/core/app": {{}}}}}}</script>
        <script type="text/x-magento-init">{}</script>
        </body></html>"#,
        sku, init
    )
}

fn product_html_without_swatches(sku: &str) -> String {
    format!(
        r#"<html><head>
        <script type="application/ld+json">{{"sku": "{}"}}</script>
        </head><body>
        <script type="text/x-magento-init">{{"*": {{}}}}</script>
        </body></html>"#,
        sku
    )
}

async fn mount_listing(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("p", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_listing_never(server: &MockServer, page: u32) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("p", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[])))
        .expect(0)
        .mount(server)
        .await;
}

async fn mount_product(server: &MockServer, id: usize, body: String, delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/p/{}.html", id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(server)
        .await;
}

async fn mount_lookup(server: &MockServer, sku: &str, color: &str, size: &str, delay_ms: u64) {
    let payload = format!(
        "sku={}&options%5B277%5D={}&options%5B617%5D={}",
        sku, color, size
    );
    Mock::given(method("POST"))
        .and(path(LOOKUP_PATH))
        .and(body_string_contains(payload))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": format!("{}-{}-{}", sku, color, size), "qty": 1}))
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_single_category() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links = vec![product_url(&base_url, 1), product_url(&base_url, 2)];
    mount_listing(&mock_server, 1, listing_html(&links)).await;
    mount_listing_never(&mock_server, 2).await;

    mount_product(
        &mock_server,
        1,
        product_html("SKU-1", &[("10", "Negro")], &[("20", "M"), ("21", "L")]),
        0,
    )
    .await;
    mount_product(
        &mock_server,
        2,
        product_html("SKU-2", &[("11", "Azul")], &[("20", "M")]),
        0,
    )
    .await;

    mount_lookup(&mock_server, "SKU-1", "10", "20", 0).await;
    mount_lookup(&mock_server, "SKU-1", "10", "21", 0).await;
    mount_lookup(&mock_server, "SKU-2", "11", "20", 0).await;

    let config = create_test_config(&base_url, &["abrigos"], 3);
    let harvester = Harvester::new(config).expect("Failed to create harvester");
    let result = harvester.run().await;

    assert_eq!(result.categories.len(), 1);
    let category = &result.categories[0];
    assert_eq!(category.category, "abrigos");
    assert_eq!(category.products.len(), 2);
    assert_eq!(category.stats.pages_scanned, 1);
    assert!(!category.stats.truncated);

    let first = &category.products[0];
    assert_eq!(first.sku.as_deref(), Some("SKU-1"));
    assert_eq!(first.product_id, Some(9001));
    assert_eq!(first.store, "stevens");
    assert_eq!(first.category, "abrigos");
    assert!(first.prices.contains_key("9002"));
    assert_eq!(first.variants.len(), 2);
    assert_eq!(first.variants[0].variant_id.as_deref(), Some("SKU-1-10-20"));
    assert_eq!(first.variants[1].variant_id.as_deref(), Some("SKU-1-10-21"));

    let second = &category.products[1];
    assert_eq!(second.sku.as_deref(), Some("SKU-2"));
    assert_eq!(second.variants.len(), 1);
    assert_eq!(second.variants[0].color, "Azul");
}

#[tokio::test]
async fn test_abrigos_stops_after_short_second_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Product pages are never mounted, so every product fetch 404s
    let page1: Vec<String> = (1..=36).map(|i| product_url(&base_url, i)).collect();
    let page2: Vec<String> = (37..=46).map(|i| product_url(&base_url, i)).collect();
    mount_listing(&mock_server, 1, listing_html(&page1)).await;
    mount_listing(&mock_server, 2, listing_html(&page2)).await;
    mount_listing_never(&mock_server, 3).await;

    let config = create_test_config(&base_url, &["abrigos"], 36);
    let harvester = Harvester::new(config).expect("Failed to create harvester");
    let result = harvester.run().await;

    let category = &result.categories[0];
    assert_eq!(category.stats.pages_scanned, 2);
    assert_eq!(category.stats.links_found, 46);
    assert_eq!(category.stats.products_skipped, 46);
    assert!(category.products.is_empty());
    assert!(!category.stats.truncated);
}

#[tokio::test]
async fn test_stops_on_empty_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let page1: Vec<String> = (1..=2).map(|i| product_url(&base_url, i)).collect();
    mount_listing(&mock_server, 1, listing_html(&page1)).await;
    mount_listing(&mock_server, 2, listing_html(&[])).await;
    mount_listing_never(&mock_server, 3).await;

    let config = create_test_config(&base_url, &["abrigos"], 2);
    let harvester = Harvester::new(config).expect("Failed to create harvester");
    let result = harvester.run().await;

    assert_eq!(result.categories[0].stats.pages_scanned, 2);
}

#[tokio::test]
async fn test_cards_without_href_count_towards_page_size() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Two cards, one without href: still a full page of 2
    let page1 = format!(
        r#"<html><body>
        <a class="product photo product-item-photo" href="{}"></a>
        <a class="product photo product-item-photo"></a>
        </body></html>"#,
        product_url(&base_url, 1)
    );
    mount_listing(&mock_server, 1, page1).await;
    mount_listing(&mock_server, 2, listing_html(&[])).await;

    let config = create_test_config(&base_url, &["abrigos"], 2);
    let harvester = Harvester::new(config).expect("Failed to create harvester");
    let result = harvester.run().await;

    let category = &result.categories[0];
    assert_eq!(category.stats.pages_scanned, 2);
    assert_eq!(category.stats.links_found, 1);
}

#[tokio::test]
async fn test_listing_failure_truncates_category() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let page1: Vec<String> = (1..=2).map(|i| product_url(&base_url, i)).collect();
    mount_listing(&mock_server, 1, listing_html(&page1)).await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("p", "2"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_listing_never(&mock_server, 3).await;

    for id in 1..=2 {
        mount_product(
            &mock_server,
            id,
            product_html(&format!("SKU-{}", id), &[], &[]),
            0,
        )
        .await;
    }

    let config = create_test_config(&base_url, &["abrigos"], 2);
    let harvester = Harvester::new(config).expect("Failed to create harvester");
    let result = harvester.run().await;

    let category = &result.categories[0];
    assert!(category.stats.truncated);
    assert_eq!(category.stats.pages_scanned, 1);
    let skus: Vec<_> = category
        .products
        .iter()
        .map(|p| p.sku.clone().unwrap_or_default())
        .collect();
    assert_eq!(skus, vec!["SKU-1", "SKU-2"]);
}

#[tokio::test]
async fn test_listing_failure_on_first_page_yields_empty_category() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("p", "1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_listing_never(&mock_server, 2).await;

    let config = create_test_config(&base_url, &["abrigos"], 36);
    let harvester = Harvester::new(config).expect("Failed to create harvester");
    let result = harvester.run().await;

    let category = &result.categories[0];
    assert!(category.products.is_empty());
    assert!(category.stats.truncated);
    assert_eq!(category.stats.pages_scanned, 0);
}

#[tokio::test]
async fn test_product_without_swatch_config_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links: Vec<String> = (1..=3).map(|i| product_url(&base_url, i)).collect();
    mount_listing(&mock_server, 1, listing_html(&links)).await;

    mount_product(&mock_server, 1, product_html("SKU-1", &[], &[]), 0).await;
    mount_product(&mock_server, 2, product_html_without_swatches("SKU-2"), 0).await;
    mount_product(&mock_server, 3, product_html("SKU-3", &[], &[]), 0).await;

    let config = create_test_config(&base_url, &["abrigos"], 36);
    let harvester = Harvester::new(config).expect("Failed to create harvester");
    let result = harvester.run().await;

    let category = &result.categories[0];
    let skus: Vec<_> = category
        .products
        .iter()
        .map(|p| p.sku.clone().unwrap_or_default())
        .collect();
    assert_eq!(skus, vec!["SKU-1", "SKU-3"]);
    assert_eq!(category.stats.products_skipped, 1);
}

#[tokio::test]
async fn test_variant_lookup_failure_keeps_null_record() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_listing(&mock_server, 1, listing_html(&[product_url(&base_url, 1)])).await;
    mount_product(
        &mock_server,
        1,
        product_html("SKU-1", &[("10", "Negro")], &[("20", "M"), ("21", "L")]),
        0,
    )
    .await;

    mount_lookup(&mock_server, "SKU-1", "10", "20", 0).await;
    Mock::given(method("POST"))
        .and(path(LOOKUP_PATH))
        .and(body_string_contains("options%5B617%5D=21"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &["abrigos"], 36);
    let harvester = Harvester::new(config).expect("Failed to create harvester");
    let result = harvester.run().await;

    let product = &result.categories[0].products[0];
    assert_eq!(product.variants.len(), 2);

    assert_eq!(product.variants[0].variant_id.as_deref(), Some("SKU-1-10-20"));
    assert!(product.variants[0].is_resolved());

    let failed = &product.variants[1];
    assert_eq!(failed.variant_id, None);
    assert_eq!(failed.response, None);
    assert_eq!(failed.color_id, "10");
    assert_eq!(failed.size_id, "21");
    assert_eq!(failed.size, "L");

    assert_eq!(result.categories[0].stats.variants_unresolved, 1);
}

#[tokio::test]
async fn test_undecodable_lookup_response_keeps_null_record() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_listing(&mock_server, 1, listing_html(&[product_url(&base_url, 1)])).await;
    mount_product(
        &mock_server,
        1,
        product_html("SKU-1", &[("10", "Negro")], &[("20", "M")]),
        0,
    )
    .await;
    Mock::given(method("POST"))
        .and(path(LOOKUP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &["abrigos"], 36);
    let harvester = Harvester::new(config).expect("Failed to create harvester");
    let result = harvester.run().await;

    let product = &result.categories[0].products[0];
    assert_eq!(product.variants.len(), 1);
    assert_eq!(product.variants[0].variant_id, None);
    assert_eq!(product.variants[0].color, "Negro");
}

#[tokio::test]
async fn test_output_order_independent_of_latency() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links: Vec<String> = (1..=4).map(|i| product_url(&base_url, i)).collect();
    mount_listing(&mock_server, 1, listing_html(&links)).await;

    // Earlier products and variants answer last
    for id in 1..=4usize {
        let sku = format!("SKU-{}", id);
        mount_product(
            &mock_server,
            id,
            product_html(&sku, &[("10", "Negro"), ("11", "Azul")], &[("20", "M"), ("21", "L")]),
            (5 - id as u64) * 40,
        )
        .await;

        let mut delay = 60;
        for color in ["10", "11"] {
            for size in ["20", "21"] {
                mount_lookup(&mock_server, &sku, color, size, delay).await;
                delay -= 15;
            }
        }
    }

    let config = create_test_config(&base_url, &["abrigos"], 36);
    let harvester = Harvester::new(config).expect("Failed to create harvester");
    let result = harvester.run().await;

    let products = &result.categories[0].products;
    let skus: Vec<_> = products
        .iter()
        .map(|p| p.sku.clone().unwrap_or_default())
        .collect();
    assert_eq!(skus, vec!["SKU-1", "SKU-2", "SKU-3", "SKU-4"]);

    for product in products {
        let sku = product.sku.as_deref().unwrap();
        let ids: Vec<_> = product
            .variants
            .iter()
            .map(|v| v.variant_id.clone().unwrap_or_default())
            .collect();
        assert_eq!(
            ids,
            vec![
                format!("{}-10-20", sku),
                format!("{}-10-21", sku),
                format!("{}-11-20", sku),
                format!("{}-11-21", sku),
            ]
        );
    }
}

#[tokio::test]
async fn test_categories_returned_in_request_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // The first category answers last
    Mock::given(method("GET"))
        .and(path("/dama/ropa-de-dama/abrigos.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_html(&[product_url(&base_url, 1)]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dama/ropa-de-dama/blazers-y-cardigans.html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing_html(&[product_url(&base_url, 2)])),
        )
        .mount(&mock_server)
        .await;
    mount_product(&mock_server, 1, product_html("SKU-1", &[], &[]), 0).await;
    mount_product(&mock_server, 2, product_html("SKU-2", &[], &[]), 0).await;

    let config = create_test_config(&base_url, &["abrigos", "blazers-y-cardigans"], 36);
    let harvester = Harvester::new(config).expect("Failed to create harvester");
    let result = harvester.run().await;

    let names: Vec<_> = result
        .categories
        .iter()
        .map(|c| c.category.as_str())
        .collect();
    assert_eq!(names, vec!["abrigos", "blazers-y-cardigans"]);
    assert_eq!(result.categories[0].products[0].category, "abrigos");
    assert_eq!(result.categories[1].products[0].category, "blazers-y-cardigans");
}

#[tokio::test]
async fn test_max_pages_bounds_pagination() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_listing(&mock_server, 1, listing_html(&[product_url(&base_url, 1)])).await;
    mount_listing(&mock_server, 2, listing_html(&[product_url(&base_url, 2)])).await;
    mount_listing_never(&mock_server, 3).await;

    let mut config = create_test_config(&base_url, &["abrigos"], 1);
    config.site.max_pages = Some(2);
    let harvester = Harvester::new(config).expect("Failed to create harvester");
    let result = harvester.run().await;

    assert_eq!(result.categories[0].stats.pages_scanned, 2);
}

#[tokio::test]
async fn test_configured_headers_are_sent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(header("cookie", "PHPSESSID=test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing_html(&[product_url(&base_url, 1)])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/1.html"))
        .and(header("cookie", "PHPSESSID=test"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_html(
            "SKU-1",
            &[("10", "Negro")],
            &[("20", "M")],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(LOOKUP_PATH))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .and(header(
            "content-type",
            "application/x-www-form-urlencoded; charset=UTF-8",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "77"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, &["abrigos"], 36);
    config
        .headers
        .page
        .insert("Cookie".to_string(), "PHPSESSID=test".to_string());
    config
        .headers
        .lookup
        .insert("x-requested-with".to_string(), "XMLHttpRequest".to_string());

    let harvester = Harvester::new(config).expect("Failed to create harvester");
    let result = harvester.run().await;

    let product = &result.categories[0].products[0];
    assert_eq!(product.variants[0].variant_id.as_deref(), Some("77"));
}
