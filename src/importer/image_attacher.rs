// ==========================================
// 商品目录导入系统 - 图片挂载
// ==========================================
// 职责: 按相对文件名在图片根目录下定位原图，挂到商品图片列表末尾
// 规则:
// - 文件名为空: 不处理
// - 文件不存在/不可读/路径越出根目录: 记 warn 并返回，不算行失败
// - 目录写入失败照常向上返回
// ==========================================

use crate::domain::catalog::Image;
use crate::domain::types::ProductId;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::RepositoryResult;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

pub struct ImageAttacher<'a, C: CatalogRepository + ?Sized> {
    catalog: &'a C,
    root: &'a Path,
}

impl<'a, C: CatalogRepository + ?Sized> ImageAttacher<'a, C> {
    pub fn new(catalog: &'a C, root: &'a Path) -> Self {
        Self { catalog, root }
    }

    /// 挂载图片
    ///
    /// # 参数
    /// - relative_filename: 文件名（相对图片根目录）
    /// - subdirectory: 可选子目录（如供应商目录）
    ///
    /// # 返回
    /// - Ok(Some(Image)): 已挂载
    /// - Ok(None): 文件名为空或文件不可用
    pub fn attach(
        &self,
        relative_filename: &str,
        subdirectory: Option<&str>,
        product_id: ProductId,
    ) -> RepositoryResult<Option<Image>> {
        let relative_filename = relative_filename.trim();
        if relative_filename.is_empty() {
            return Ok(None);
        }

        let Some(path) = self.resolve(relative_filename, subdirectory) else {
            warn!(
                product_id = %product_id,
                file = %relative_filename,
                "图片路径越出图片根目录，未导入"
            );
            return Ok(None);
        };

        let content = match std::fs::read(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    product_id = %product_id,
                    path = %path.display(),
                    error = %e,
                    "Image {} was not found on the server, so this image was not imported.",
                    path.display()
                );
                return Ok(None);
            }
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| relative_filename.to_string());
        let position = self.catalog.count_product_images(product_id)?;
        let image = self
            .catalog
            .attach_image(product_id, &file_name, &content, position)?;

        info!(
            product_id = %product_id,
            image_id = %image.id,
            position,
            bytes = image.byte_size,
            "图片已挂载"
        );
        Ok(Some(image))
    }

    /// 拼接绝对路径；含 `..` 或绝对路径成分时返回 None
    fn resolve(&self, relative_filename: &str, subdirectory: Option<&str>) -> Option<PathBuf> {
        let mut path = self.root.to_path_buf();
        let subdirectory = subdirectory.map(str::trim).filter(|s| !s.is_empty());
        for part in subdirectory.into_iter().chain(std::iter::once(relative_filename)) {
            let part = Path::new(part);
            if !part
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
            {
                return None;
            }
            path.push(part);
        }
        Some(path)
    }
}
