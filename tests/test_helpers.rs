// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时输入文件 / 输出目录 / 标准测试数据
// ==========================================

#![allow(dead_code)]

use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

/// 葡萄牙语表头（六个必填列）
pub const PT_HEADER: &str = "Codigo,CritEng,PrazoEntrega,Custo,Estoque,ConsumoDiario";

/// 三行基准数据: 覆盖天数 25 / 50 / 180
pub fn three_row_csv() -> String {
    format!(
        "{}\nM1,5,30,100,50,2\nM2,1,10,20,500,10\nM3,3,20,50,0,0\n",
        PT_HEADER
    )
}

/// 写入临时文件（保留扩展名以便按格式分派）
pub fn write_temp(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("bom_")
        .suffix(suffix)
        .tempfile()
        .expect("创建临时文件失败");
    file.write_all(content.as_bytes()).expect("写入临时文件失败");
    file.flush().expect("刷新临时文件失败");
    file
}

pub fn write_csv(content: &str) -> NamedTempFile {
    write_temp(content, ".csv")
}

/// 临时输出目录
pub fn output_dir() -> TempDir {
    tempfile::tempdir().expect("创建临时目录失败")
}
