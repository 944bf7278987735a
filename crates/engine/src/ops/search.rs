use sea_orm::{
    Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
    sea_query::{Expr, LikeExpr},
};

use crate::{EngineError, Item, ItemSearch, Page, ResultEngine, items, util::fold_key};

use super::{Engine, with_tx};

/// Builds a case-folded `%text%` pattern with the LIKE wildcards of `text`
/// escaped. Matched against the folded `*_key` columns.
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in fold_key(text).chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn search_condition(search: &ItemSearch) -> ResultEngine<Condition> {
    if let (Some(min), Some(max)) = (search.min_price, search.max_price)
        && min > max
    {
        return Err(EngineError::InvalidInput(format!(
            "min_price {min} is above max_price {max}"
        )));
    }

    let mut condition = Condition::all();

    if let Some(text) = search.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = contains_pattern(text);
        condition = condition.add(
            Condition::any()
                .add(
                    Expr::col(items::Column::NameKey)
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(
                    Expr::col(items::Column::DescriptionKey)
                        .like(LikeExpr::new(pattern).escape('\\')),
                ),
        );
    }
    // A NULL price never satisfies a comparison, so unpriced items drop out
    // as soon as either bound is set.
    if let Some(min) = search.min_price {
        condition = condition.add(items::Column::PriceMinor.gte(min.cents()));
    }
    if let Some(max) = search.max_price {
        condition = condition.add(items::Column::PriceMinor.lte(max.cents()));
    }
    if let Some(owner_id) = search.owner_id {
        condition = condition.add(items::Column::OwnerId.eq(owner_id.to_string()));
    }
    if let Some(available) = search.available {
        condition = condition.add(items::Column::IsAvailable.eq(available));
    }

    Ok(condition)
}

impl Engine {
    /// Finds items matching every filter set on `search`.
    ///
    /// Results are ordered by creation time, then id, so paging is stable.
    pub async fn search_items(&self, search: &ItemSearch, page: Page) -> ResultEngine<Vec<Item>> {
        let condition = search_condition(search)?;
        with_tx!(self, |db_tx| {
            let models = items::Entity::find()
                .filter(condition)
                .order_by_asc(items::Column::CreatedAt)
                .order_by_asc(items::Column::Id)
                .offset(page.offset)
                .limit(page.limit)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Item::try_from).collect()
        })
    }
}
