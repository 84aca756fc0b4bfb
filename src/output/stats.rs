//! Statistics for a finished crawl
//!
//! This module summarizes a `CrawlResult` per category and overall, and
//! renders the summary for the terminal.

use crate::catalog::CrawlResult;

/// Statistics for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: String,
    pub pages_scanned: u32,
    pub links_found: usize,
    pub products_collected: usize,
    pub products_skipped: usize,
    pub variants_resolved: usize,
    pub variants_unresolved: usize,

    /// Pagination stopped on a listing page that could not be fetched
    pub truncated: bool,
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Per-category breakdown, in crawl order
    pub categories: Vec<CategorySummary>,

    pub total_products: usize,
    pub total_skipped: usize,
    pub total_variants: usize,
    pub total_unresolved: usize,
}

impl CrawlStatistics {
    /// Computes statistics from a crawl result
    pub fn from_result(result: &CrawlResult) -> Self {
        let categories: Vec<CategorySummary> = result
            .categories
            .iter()
            .map(|c| CategorySummary {
                category: c.category.clone(),
                pages_scanned: c.stats.pages_scanned,
                links_found: c.stats.links_found,
                products_collected: c.products.len(),
                products_skipped: c.stats.products_skipped,
                variants_resolved: c.stats.variants_resolved,
                variants_unresolved: c.stats.variants_unresolved,
                truncated: c.stats.truncated,
            })
            .collect();

        let total_products = categories.iter().map(|c| c.products_collected).sum();
        let total_skipped = categories.iter().map(|c| c.products_skipped).sum();
        let total_unresolved = categories.iter().map(|c| c.variants_unresolved).sum();
        let total_variants = categories
            .iter()
            .map(|c| c.variants_resolved + c.variants_unresolved)
            .sum();

        Self {
            categories,
            total_products,
            total_skipped,
            total_variants,
            total_unresolved,
        }
    }

    /// Share of variant lookups that returned usable data, in percent
    pub fn resolution_rate(&self) -> f64 {
        if self.total_variants == 0 {
            return 0.0;
        }
        let resolved = self.total_variants - self.total_unresolved;
        (resolved as f64 / self.total_variants as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Categories ({}):", stats.categories.len());
    for summary in &stats.categories {
        println!(
            "  {}: {} products from {} pages ({} links, {} skipped){}",
            summary.category,
            summary.products_collected,
            summary.pages_scanned,
            summary.links_found,
            summary.products_skipped,
            if summary.truncated {
                " [stopped early: listing fetch failed]"
            } else {
                ""
            }
        );
        println!(
            "    variants: {} resolved, {} unresolved",
            summary.variants_resolved, summary.variants_unresolved
        );
    }
    println!();

    println!("Overview:");
    println!("  Products collected: {}", stats.total_products);
    println!("  Products skipped: {}", stats.total_skipped);
    println!("  Variant lookups: {}", stats.total_variants);
    println!(
        "  Resolution Rate: {:.1}% ({} unresolved)",
        stats.resolution_rate(),
        stats.total_unresolved
    );
}
