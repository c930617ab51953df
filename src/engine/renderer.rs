// ==========================================
// 检验报告(CoA)系统 - 报告渲染
// ==========================================
// 职责: 报告输出的抽象接口 + JSON Lines 实现
// ==========================================

use crate::engine::report::OrderReport;
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("报告序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("报告写出失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 报告渲染器
///
/// 文档版式（工作簿、PDF 等）由具体实现决定，解析引擎只产出 `OrderReport`
pub trait ReportRenderer {
    fn render(&mut self, report: &OrderReport) -> Result<(), RenderError>;

    fn finish(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

// ==========================================
// JsonLinesRenderer - 每个销售订单一行 JSON
// ==========================================
pub struct JsonLinesRenderer<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportRenderer for JsonLinesRenderer<W> {
    fn render(&mut self, report: &OrderReport) -> Result<(), RenderError> {
        serde_json::to_writer(&mut self.writer, report)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str) -> OrderReport {
        OrderReport {
            batch_id: "b-1".to_string(),
            order_id: id.to_string(),
            error: None,
            lots: Vec::new(),
        }
    }

    #[test]
    fn test_json_lines() {
        let mut renderer = JsonLinesRenderer::new(Vec::new());
        renderer.render(&order("SO-1")).unwrap();
        renderer.render(&order("SO-2")).unwrap();
        renderer.finish().unwrap();
        assert_eq!(renderer.written(), 2);

        let output = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["orderId"], "SO-1");
    }
}
