// mercado/src/catalog/command.rs

use crate::model::{Product, ProductDraft, ProductId, ProductPatch};

/// One catalog mutation. Every change to the product list is expressed as a
/// command and goes through [`crate::catalog::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogCommand {
  AddProduct(ProductDraft),
  UpdateFields { id: ProductId, patch: ProductPatch },
  SetStock { id: ProductId, stock: u32 },
  SetImages { id: ProductId, images: Vec<String> },
  ToggleVisibility { id: ProductId },
  Remove { id: ProductId },
}

impl CatalogCommand {
  /// Short name used in logs and notices.
  pub fn kind(&self) -> &'static str {
    match self {
      CatalogCommand::AddProduct(_) => "add_product",
      CatalogCommand::UpdateFields { .. } => "update_fields",
      CatalogCommand::SetStock { .. } => "set_stock",
      CatalogCommand::SetImages { .. } => "set_images",
      CatalogCommand::ToggleVisibility { .. } => "toggle_visibility",
      CatalogCommand::Remove { .. } => "remove",
    }
  }
}

/// What a successfully applied command did.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandEffect {
  Added(ProductId),
  Updated(ProductId),
  VisibilityChanged { id: ProductId, is_visible: bool },
  Removed(Product),
}

impl CommandEffect {
  pub fn product_id(&self) -> &ProductId {
    match self {
      CommandEffect::Added(id) | CommandEffect::Updated(id) => id,
      CommandEffect::VisibilityChanged { id, .. } => id,
      CommandEffect::Removed(product) => &product.id,
    }
  }
}
