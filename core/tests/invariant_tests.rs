// tests/invariant_tests.rs
mod common;

use common::*;
use mercado::catalog::{apply, default_catalog, stock_status, visible_products};
use mercado::{CatalogCommand, Product, ProductPatch, StockSeverity};
use proptest::prelude::*;
use proptest::test_runner::Config;
use rand::rngs::StdRng;
use rand::SeedableRng;

// Commands address products by position so most of them hit an existing id.
#[derive(Debug, Clone)]
enum Op {
  Add { stock: u32 },
  SetStock { at: usize, stock: u32 },
  PatchStock { at: usize, stock: u32 },
  SetImages { at: usize, count: usize },
  Toggle { at: usize },
  Remove { at: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
  prop_oneof![
    (0_u32..4).prop_map(|stock| Op::Add { stock }),
    (0_usize..16, 0_u32..4).prop_map(|(at, stock)| Op::SetStock { at, stock }),
    (0_usize..16, 0_u32..4).prop_map(|(at, stock)| Op::PatchStock { at, stock }),
    (0_usize..16, 0_usize..4).prop_map(|(at, count)| Op::SetImages { at, count }),
    (0_usize..16).prop_map(|at| Op::Toggle { at }),
    (0_usize..16).prop_map(|at| Op::Remove { at }),
  ]
}

fn id_at(products: &[Product], at: usize) -> mercado::ProductId {
  if products.is_empty() {
    return mercado::ProductId::from("missing");
  }
  products[at % products.len()].id.clone()
}

fn to_command(products: &[Product], op: &Op) -> CatalogCommand {
  match *op {
    Op::Add { stock } => CatalogCommand::AddProduct(draft("Generado", stock)),
    Op::SetStock { at, stock } => CatalogCommand::SetStock {
      id: id_at(products, at),
      stock,
    },
    Op::PatchStock { at, stock } => CatalogCommand::UpdateFields {
      id: id_at(products, at),
      patch: ProductPatch {
        stock: Some(stock),
        ..Default::default()
      },
    },
    Op::SetImages { at, count } => CatalogCommand::SetImages {
      id: id_at(products, at),
      images: (0..count).map(|i| format!("/img/{}.jpg", i)).collect(),
    },
    Op::Toggle { at } => CatalogCommand::ToggleVisibility { id: id_at(products, at) },
    Op::Remove { at } => CatalogCommand::Remove { id: id_at(products, at) },
  }
}

proptest! {
  #![proptest_config(Config::with_cases(128))]
  #[test]
  fn catalog_invariants_hold_after_any_command_sequence(
    seed in any::<u64>(),
    ops in proptest::collection::vec(op_strategy(), 1..40)
  ) {
    let mut products = default_catalog(START_MILLIS, &mut StdRng::seed_from_u64(seed));
    for (step, op) in ops.iter().enumerate() {
      let command = to_command(&products, op);
      let before = products.clone();
      let result = apply(&mut products, command, START_MILLIS + step as i64);
      if result.is_err() {
        prop_assert_eq!(&products, &before);
      }

      for p in &products {
        if p.stock == 0 {
          prop_assert!(!p.is_visible, "product {} has zero stock but is visible", p.id);
        }
        if let Some(primary) = p.images.first() {
          prop_assert_eq!(&p.image, primary);
        }
      }
      let visible = visible_products(&products);
      for v in &visible {
        prop_assert!(v.stock > 0 && v.is_visible);
        prop_assert!(products.iter().any(|p| p.id == v.id));
      }
    }
  }

  #[test]
  fn stock_status_is_total_and_pure(stock in any::<u32>()) {
    let status = stock_status(stock);
    prop_assert_eq!(&status, &stock_status(stock));
    let expected = match stock {
      0 => StockSeverity::Critical,
      1 | 2 => StockSeverity::Warning,
      _ => StockSeverity::Normal,
    };
    prop_assert_eq!(status.severity, expected);
    if stock == 1 || stock == 2 {
      prop_assert!(status.label.contains(&stock.to_string()));
    }
  }
}
