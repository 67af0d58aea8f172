// mercado/src/catalog/query.rs

//! Read-only views over a product list. Nothing here is stored.

use crate::model::Product;

/// Products a shopper can see and buy.
pub fn visible_products(products: &[Product]) -> Vec<Product> {
  products.iter().filter(|p| p.is_purchasable()).cloned().collect()
}

/// Distinct categories in first-seen order.
pub fn categories(products: &[Product]) -> Vec<String> {
  let mut seen: Vec<String> = Vec::new();
  for product in products {
    if !seen.iter().any(|c| *c == product.category) {
      seen.push(product.category.clone());
    }
  }
  seen
}

/// `None` or `"all"` keeps every product.
pub fn filter_by_category<'a>(products: &'a [Product], category: Option<&str>) -> Vec<&'a Product> {
  match category {
    None | Some("all") => products.iter().collect(),
    Some(wanted) => products.iter().filter(|p| p.category == wanted).collect(),
  }
}

/// Case-insensitive substring match over name, description, location and
/// category. A blank query matches nothing.
pub fn search<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
  let needle = query.trim().to_lowercase();
  if needle.is_empty() {
    return Vec::new();
  }
  products
    .iter()
    .filter(|p| {
      [&p.name, &p.description, &p.location, &p.category]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    })
    .collect()
}
