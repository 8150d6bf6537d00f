// ==========================================
// 商品目录导入系统 - 文本解码器
// ==========================================
// 职责: 商品名称/描述的 HTML 实体解码（&amp; → &，&gt; → > 等）
// 工具: quick-xml escape 模块（HTML5 实体表）
// 约束: 无法识别的实体原样保留，解码永不失败
// ==========================================

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use std::borrow::Cow;

/// 实体最长长度（含 & 与 ;），超过即视为普通文本
const MAX_ENTITY_LEN: usize = 40;

// ==========================================
// TextDecoder Trait
// ==========================================
pub trait TextDecoder {
    fn decode<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

/// 不解码
pub struct PassThrough;

impl TextDecoder for PassThrough {
    fn decode<'a>(&self, input: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(input)
    }
}

/// HTML 实体解码
pub struct HtmlEntityDecoder;

impl TextDecoder for HtmlEntityDecoder {
    fn decode<'a>(&self, input: &'a str) -> Cow<'a, str> {
        if !input.contains('&') {
            return Cow::Borrowed(input);
        }

        // 整串可解码时走快速路径
        if let Ok(decoded) = unescape_with(input, resolve_html5_entity) {
            return decoded;
        }

        // 逐个实体解码，孤立的 & 或未知实体保留原文
        let mut output = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(amp) = rest.find('&') {
            output.push_str(&rest[..amp]);
            let tail = &rest[amp..];
            let entity_end = tail
                .char_indices()
                .skip(1)
                .take_while(|(idx, ch)| *idx < MAX_ENTITY_LEN && *ch != '&' && !ch.is_whitespace())
                .find(|(_, ch)| *ch == ';')
                .map(|(idx, _)| idx);

            match entity_end {
                Some(end) => {
                    let candidate = &tail[..=end];
                    match unescape_with(candidate, resolve_html5_entity) {
                        Ok(decoded) => output.push_str(&decoded),
                        Err(_) => output.push_str(candidate),
                    }
                    rest = &tail[end + 1..];
                }
                None => {
                    output.push('&');
                    rest = &tail[1..];
                }
            }
        }
        output.push_str(rest);
        Cow::Owned(output)
    }
}

/// 按开关选择解码器
pub fn decoder_for(enabled: bool) -> Box<dyn TextDecoder> {
    if enabled {
        Box::new(HtmlEntityDecoder)
    } else {
        Box::new(PassThrough)
    }
}
