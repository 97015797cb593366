//! 后台文件清理队列
//!
//! 照片删除后异步移除对应的存储文件，调用方不等待结果

use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;

use super::storage::PhotoStorage;

/// 文件清理队列（单工作线程）
pub struct CleanupQueue {
    sender: Sender<String>,
}

impl CleanupQueue {
    pub fn new(storage: Arc<dyn PhotoStorage>) -> Self {
        let (sender, receiver) = mpsc::channel::<String>();

        let spawned = thread::Builder::new()
            .name("photo-cleanup".to_string())
            .spawn(move || {
                // 发送端全部释放后退出
                for filename in receiver {
                    match storage.remove(&filename) {
                        Ok(()) => tracing::debug!("已清理文件: {}", filename),
                        Err(e) => tracing::warn!("清理文件失败 {}: {}", filename, e),
                    }
                }
                tracing::debug!("清理线程退出");
            });

        if let Err(e) = spawned {
            tracing::error!("无法启动清理线程: {}", e);
        }

        Self { sender }
    }

    /// 提交清理任务，不阻塞也不返回结果
    pub fn submit(&self, filename: String) {
        if self.sender.send(filename).is_err() {
            tracing::warn!("清理线程不可用，任务被丢弃");
        }
    }
}
