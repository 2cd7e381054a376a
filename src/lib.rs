// ツアー予約サービス
// ドメイン層・アプリケーション層・アダプター層の3層で構成する

pub mod adapter;
pub mod application;
pub mod domain;
