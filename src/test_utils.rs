//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::L10nSettings;
use crate::dom::{
    Document,
    NodeId,
    SharedDocument,
};

/// `html` をパースして共有ドキュメントを作成する
#[allow(clippy::unwrap_used)]
pub(crate) fn shared_document(html: &str) -> SharedDocument {
    Rc::new(RefCell::new(Document::parse_html(html).unwrap()))
}

/// 分離マークを付けないデフォルト設定
///
/// フォーマット結果をそのまま文字列比較できる。
pub(crate) fn plain_settings() -> L10nSettings {
    L10nSettings { use_isolating: false, ..L10nSettings::default() }
}

/// `data-l10n-id="{id}"` を持つ最初の要素を返す
#[allow(clippy::unwrap_used)]
pub(crate) fn element_by_l10n_id(doc: &SharedDocument, id: &str) -> NodeId {
    let doc = doc.borrow();
    doc.descendants(Document::ROOT)
        .into_iter()
        .find(|node| doc.get_attribute(*node, crate::types::L10N_ID_ATTR) == Some(id))
        .unwrap()
}
