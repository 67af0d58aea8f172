// mercado/src/order/cart.rs

use crate::error::{MercadoError, MercadoResult};
use crate::model::{Product, ProductId};

#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
  pub product_id: ProductId,
  pub name: String,
  pub price: f64,
  pub quantity: u32,
  pub image: String,
  /// Stock at the time the product was added; caps the quantity.
  pub max_quantity: u32,
}

impl CartItem {
  pub fn line_total(&self) -> f64 {
    self.price * f64::from(self.quantity)
  }
}

/// Items keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct Cart {
  items: Vec<CartItem>,
}

fn cart_error(message: impl Into<String>) -> MercadoError {
  MercadoError::Cart { message: message.into() }
}

impl Cart {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds `quantity` units, merging with an existing line for the same product.
  pub fn add_item(&mut self, product: &Product, quantity: u32) -> MercadoResult<()> {
    if quantity == 0 {
      return Err(cart_error("quantity must be at least 1"));
    }
    if !product.is_purchasable() {
      return Err(MercadoError::OutOfStock {
        id: product.id.to_string(),
      });
    }

    match self.items.iter_mut().find(|item| item.product_id == product.id) {
      Some(item) => {
        let wanted = item.quantity.saturating_add(quantity);
        if wanted > product.stock {
          return Err(cart_error(format!(
            "only {} units of '{}' are available",
            product.stock, product.name
          )));
        }
        item.quantity = wanted;
        item.max_quantity = product.stock;
      }
      None => {
        if quantity > product.stock {
          return Err(cart_error(format!(
            "only {} units of '{}' are available",
            product.stock, product.name
          )));
        }
        self.items.push(CartItem {
          product_id: product.id.clone(),
          name: product.name.clone(),
          price: product.price,
          quantity,
          image: product.primary_image().unwrap_or(&product.image).to_string(),
          max_quantity: product.stock,
        });
      }
    }
    Ok(())
  }

  /// Zero removes the line.
  pub fn update_quantity(&mut self, id: &ProductId, quantity: u32) -> MercadoResult<()> {
    if quantity == 0 {
      self.remove_item(id);
      return Ok(());
    }
    let item = self
      .items
      .iter_mut()
      .find(|item| item.product_id == *id)
      .ok_or_else(|| MercadoError::not_found(id.as_str()))?;
    if quantity > item.max_quantity {
      return Err(cart_error(format!(
        "only {} units of '{}' are available",
        item.max_quantity, item.name
      )));
    }
    item.quantity = quantity;
    Ok(())
  }

  pub fn remove_item(&mut self, id: &ProductId) -> bool {
    let before = self.items.len();
    self.items.retain(|item| item.product_id != *id);
    self.items.len() != before
  }

  pub fn clear(&mut self) {
    self.items.clear();
  }

  pub fn items(&self) -> &[CartItem] {
    &self.items
  }

  pub fn item_count(&self) -> u32 {
    self.items.iter().map(|item| item.quantity).sum()
  }

  pub fn subtotal(&self) -> f64 {
    self.items.iter().map(CartItem::line_total).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::default_catalog;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn product(stock: u32) -> Product {
    let mut product = default_catalog(1_000, &mut StdRng::seed_from_u64(3)).remove(0);
    product.set_stock(stock);
    product
  }

  #[test]
  fn test_merges_lines_and_caps_at_stock() {
    let p = product(3);
    let mut cart = Cart::new();
    cart.add_item(&p, 2).unwrap();
    cart.add_item(&p, 1).unwrap();
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.item_count(), 3);
    assert!(matches!(cart.add_item(&p, 1), Err(MercadoError::Cart { .. })));
  }

  #[test]
  fn test_rejects_out_of_stock_products() {
    let p = product(0);
    let mut cart = Cart::new();
    assert!(matches!(cart.add_item(&p, 1), Err(MercadoError::OutOfStock { .. })));
    assert!(cart.is_empty());
  }

  #[test]
  fn test_zero_quantity_removes_the_line() {
    let p = product(5);
    let mut cart = Cart::new();
    cart.add_item(&p, 2).unwrap();
    cart.update_quantity(&p.id, 0).unwrap();
    assert!(cart.is_empty());
    assert_eq!(cart.subtotal(), 0.0);
  }
}
