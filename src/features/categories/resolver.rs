/// カテゴリー名の解決
///
/// サブスクリプションのcategory_idから表示名を引き、追加フォームで入力された
/// カテゴリー名を既存IDへ対応付ける（存在しなければ作成する）。
use crate::features::categories::models::Category;
use crate::features::store::remote::RemoteStore;
use crate::shared::errors::{AppError, AppResult};
use log::info;

/// 追加フォームで提示するカテゴリー候補
pub const SUGGESTED_CATEGORY_NAMES: [&str; 7] = [
    "Streaming",
    "Productivity",
    "Cloud Storage",
    "Music",
    "Gaming",
    "News",
    "Other",
];

/// カテゴリー名解決の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryResolution {
    /// 既存のカテゴリーを再利用した
    Existing { id: i64 },
    /// 新しいカテゴリーを作成した
    Created(Category),
}

impl CategoryResolution {
    pub fn id(&self) -> i64 {
        match self {
            CategoryResolution::Existing { id } => *id,
            CategoryResolution::Created(category) => category.id,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, CategoryResolution::Created(_))
    }
}

/// カテゴリーIDから表示名を取得する
///
/// IDがない場合や一覧に存在しない場合はNoneを返す
pub fn resolve_name(category_id: Option<i64>, categories: &[Category]) -> Option<&str> {
    let id = category_id?;
    categories
        .iter()
        .find(|category| category.id == id)
        .map(|category| category.name.as_str())
}

/// 入力されたカテゴリー名を既存IDに解決し、なければ作成する
///
/// # 引数
/// * `typed_name` - フォームに入力されたカテゴリー名（前後の空白は除去される）
/// * `categories` - 現在のカテゴリー一覧
/// * `remote` - カテゴリー作成に使用するリモートストア
///
/// # 戻り値
/// 既存カテゴリーを使った場合は`Existing`、作成した場合は`Created`
pub async fn resolve_or_create<R: RemoteStore>(
    typed_name: &str,
    categories: &[Category],
    remote: &R,
) -> AppResult<CategoryResolution> {
    let name = typed_name.trim();
    if name.is_empty() {
        return Err(AppError::validation("カテゴリー名を入力してください"));
    }

    if let Some(existing) = categories.iter().find(|category| category.name == name) {
        return Ok(CategoryResolution::Existing { id: existing.id });
    }

    let created = remote.create_category(name).await?;
    info!(
        "カテゴリーを新規作成しました: category_id={}, name={}",
        created.id, created.name
    );
    Ok(CategoryResolution::Created(created))
}

/// まだ存在しないカテゴリー候補の一覧を返す
pub fn suggested_category_names(categories: &[Category]) -> Vec<&'static str> {
    SUGGESTED_CATEGORY_NAMES
        .iter()
        .copied()
        .filter(|suggestion| !categories.iter().any(|category| category.name == *suggestion))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::store::testing::MockRemote;

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            user_id: 1,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_resolve_name() {
        let categories = vec![category(1, "Streaming"), category(2, "Music")];

        assert_eq!(resolve_name(Some(2), &categories), Some("Music"));
        assert_eq!(resolve_name(Some(9), &categories), None);
        assert_eq!(resolve_name(None, &categories), None);
        assert_eq!(resolve_name(Some(1), &[]), None);
    }

    #[tokio::test]
    async fn test_existing_name_is_reused_without_remote_call() {
        let remote = MockRemote::new();
        let categories = vec![category(4, "Streaming")];

        let resolution = resolve_or_create("  Streaming ", &categories, &remote)
            .await
            .unwrap();

        assert_eq!(resolution, CategoryResolution::Existing { id: 4 });
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_name_is_created() {
        let remote = MockRemote::new();

        let resolution = resolve_or_create("Gaming", &[], &remote).await.unwrap();

        assert!(resolution.is_created());
        assert_eq!(remote.calls(), vec!["create_category:Gaming".to_string()]);
        assert_eq!(remote.categories().len(), 1);
        assert_eq!(resolution.id(), remote.categories()[0].id);
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let remote = MockRemote::new();
        let mut categories = Vec::new();

        let first = resolve_or_create("News", &categories, &remote).await.unwrap();
        if let CategoryResolution::Created(created) = &first {
            categories.push(created.clone());
        }
        let second = resolve_or_create("News", &categories, &remote).await.unwrap();

        assert_eq!(first.id(), second.id());
        assert!(!second.is_created());
        assert_eq!(remote.categories().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_name_is_validation_error() {
        let remote = MockRemote::new();

        let result = resolve_or_create("   ", &[], &remote).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(remote.calls().is_empty());
    }

    #[test]
    fn test_suggestions_exclude_existing_names() {
        let categories = vec![category(1, "Music"), category(2, "Other")];
        let suggestions = suggested_category_names(&categories);

        assert_eq!(suggestions.len(), 5);
        assert!(!suggestions.contains(&"Music"));
        assert!(suggestions.contains(&"Streaming"));
    }
}
