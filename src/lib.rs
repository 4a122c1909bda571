//! # 贺卡后端 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 前端 (card.html 单页应用)                 │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ HTTP / JSON（{ success, ... }）
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            后端 (Rust, axum)                     │
//! │                                                          │
//! │  ┌─ http ─────── 路由 · CORS · 16 MiB 请求体上限          │
//! │  │   ├─ cards        卡片保存 / 读取                      │
//! │  │   ├─ uploads      照片 / 音乐上传                      │
//! │  │   └─ assets       页面与已上传文件                     │
//! │  │                                                       │
//! │  ├─ image_handler    800×450 等比适配 · 留白 · 重新编码   │
//! │  ├─ cards            card_<uuid>.json 存储                │
//! │  ├─ storage          上传目录读写                         │
//! │  ├─ filename         白名单 · 文件名净化 · 唯一命名       │
//! │  ├─ config           默认值 → 配置文件 → 环境变量         │
//! │  └─ error ────────── AppError (统一错误类型)              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，所有 HTTP 处理函数的错误类型 |
//! | [`config`] | 监听地址、上传目录、请求体上限等启动配置 |
//! | [`image_handler`] | 图片适配器：解码、等比缩放、居中合成、内存编码 |
//! | [`storage`] | 照片与音乐上传目录的创建、写入与按名读取 |
//! | [`cards`] | 卡片 JSON 文档的保存与读取 |
//! | [`filename`] | 扩展名白名单、文件名净化、上传文件命名 |
//! | [`http`] | axum 路由与各接口处理函数 |

pub mod error;
pub mod cards;
pub mod config;
pub mod filename;
pub mod http;
pub mod image_handler;
pub mod storage;
