// mercado/src/catalog/reducer.rs

//! The one place where catalog commands change the product list.
//!
//! The stock/visibility coupling lives here: any stock change re-derives
//! `is_visible`, and a zero-stock product can never be toggled visible. A command
//! that fails leaves the list untouched.

use crate::catalog::command::{CatalogCommand, CommandEffect};
use crate::error::{MercadoError, MercadoResult};
use crate::model::{Product, ProductId};
use tracing::{event, Level};

/// Applies `command` to `products` at time `now` (milliseconds).
pub fn apply(products: &mut Vec<Product>, command: CatalogCommand, now: i64) -> MercadoResult<CommandEffect> {
  event!(Level::TRACE, command = command.kind(), "Applying catalog command.");
  match command {
    CatalogCommand::AddProduct(draft) => {
      draft.validate()?;
      let id = next_product_id(products, now);
      products.push(draft.into_product(id.clone(), now));
      Ok(CommandEffect::Added(id))
    }
    CatalogCommand::UpdateFields { id, patch } => {
      patch.validate()?;
      let product = find_mut(products, &id)?;
      patch.merge_into(product);
      product.updated_at = now;
      Ok(CommandEffect::Updated(id))
    }
    CatalogCommand::SetStock { id, stock } => {
      let product = find_mut(products, &id)?;
      product.set_stock(stock);
      product.updated_at = now;
      Ok(CommandEffect::Updated(id))
    }
    CatalogCommand::SetImages { id, images } => {
      if images.is_empty() {
        return Err(MercadoError::invalid("at least one image is required"));
      }
      let product = find_mut(products, &id)?;
      product.set_images(images);
      product.updated_at = now;
      Ok(CommandEffect::Updated(id))
    }
    CatalogCommand::ToggleVisibility { id } => {
      let product = find_mut(products, &id)?;
      if product.stock == 0 {
        return Err(MercadoError::OutOfStock { id: id.0 });
      }
      product.is_visible = !product.is_visible;
      product.updated_at = now;
      Ok(CommandEffect::VisibilityChanged {
        is_visible: product.is_visible,
        id,
      })
    }
    CatalogCommand::Remove { id } => {
      let index = products
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| MercadoError::not_found(id.0.clone()))?;
      Ok(CommandEffect::Removed(products.remove(index)))
    }
  }
}

fn find_mut<'a>(products: &'a mut [Product], id: &ProductId) -> MercadoResult<&'a mut Product> {
  products
    .iter_mut()
    .find(|p| p.id == *id)
    .ok_or_else(|| MercadoError::not_found(id.0.clone()))
}

// Creation timestamp as the id; bumped past any id already in use.
fn next_product_id(products: &[Product], now: i64) -> ProductId {
  let mut candidate = now;
  while products.iter().any(|p| p.id.as_str() == candidate.to_string()) {
    candidate += 1;
  }
  ProductId(candidate.to_string())
}
