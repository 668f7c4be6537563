use sea_orm::{ConnectionTrait, DbErr, EntityTrait, FromQueryResult, PaginatorTrait, Select};
use serde::Serialize;

pub const PAGE_SIZE: u64 = 12;

/// One window of an ordered result set.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub page_size: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<u64>,
    pub next_page_number: Option<u64>,
}

/// Resolves a raw `page` parameter against the page count. Missing, malformed
/// and below-one values give the first page; past-the-end gives the last.
pub fn clamp_page(requested: Option<&str>, num_pages: u64) -> u64 {
    let last = num_pages.max(1);
    let Some(raw) = requested.map(str::trim) else {
        return 1;
    };
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    match raw.parse::<i64>() {
        Ok(n) if n >= 1 => (n as u64).min(last),
        Ok(_) => 1,
        // Too many digits for an integer is still a page past the end.
        Err(_) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => last,
        Err(_) => 1,
    }
}

pub async fn paginate<'db, C, E, M>(
    db: &'db C,
    select: Select<E>,
    requested: Option<&str>,
    per_page: u64,
) -> Result<Page<M>, DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait<Model = M>,
    M: FromQueryResult + Sized + Send + Sync + 'db,
{
    let paginator = select.paginate(db, per_page);
    let counts = paginator.num_items_and_pages().await?;
    let num_pages = counts.number_of_pages.max(1);
    let number = clamp_page(requested, num_pages);
    let items = paginator.fetch_page(number - 1).await?;

    Ok(Page {
        items,
        number,
        num_pages,
        total: counts.number_of_items,
        page_size: per_page,
        has_previous: number > 1,
        has_next: number < num_pages,
        previous_page_number: (number > 1).then(|| number - 1),
        next_page_number: (number < num_pages).then(|| number + 1),
    })
}

#[cfg(test)]
mod tests {
    use super::clamp_page;

    #[test]
    fn page_numbers_are_clamped() {
        assert_eq!(clamp_page(None, 3), 1);
        assert_eq!(clamp_page(Some("abc"), 3), 1);
        assert_eq!(clamp_page(Some(""), 3), 1);
        assert_eq!(clamp_page(Some("0"), 3), 1);
        assert_eq!(clamp_page(Some("-4"), 3), 1);
        assert_eq!(clamp_page(Some("2"), 3), 2);
        assert_eq!(clamp_page(Some("99"), 3), 3);
        assert_eq!(clamp_page(Some("5"), 0), 1);
    }

    #[test]
    fn oversized_page_numbers_land_on_the_last_page() {
        assert_eq!(clamp_page(Some("99999999999999999999"), 2), 2);
        assert_eq!(clamp_page(Some(" 18446744073709551616 "), 4), 4);
        assert_eq!(clamp_page(Some("-99999999999999999999"), 2), 1);
        assert_eq!(clamp_page(Some("9999999999999999999x"), 2), 1);
        assert_eq!(clamp_page(Some("+"), 2), 1);
    }
}
