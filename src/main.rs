// ==========================================
// Rebaixa Pro - 命令行入口
// ==========================================
// 用法:
//   estoque-pro import <arquivo> [produtos|produtos_estrito|consulta|inventario]
//   estoque-pro sync
//   estoque-pro lookup <codigo>
//   estoque-pro watch
//   estoque-pro export-order [diretorio]
//   estoque-pro export-count [diretorio]
//
// 数据库路径: ESTOQUE_DB_PATH 或用户本地数据目录
// 界面语言: ESTOQUE_LOCALE（pt-BR / en）
// ==========================================

use anyhow::{Context, Result};
use chrono::Local;
use estoque_pro::app::{get_default_db_path, spawn_background_refresh, AppState};
use estoque_pro::export::ExportFile;
use estoque_pro::i18n::{self, t, t_with_args};
use estoque_pro::importer::ImportProfile;
use estoque_pro::{logging, ReportingPolicy, APP_NAME, VERSION};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn usage() -> String {
    format!(
        "{} {}\n\nuso:\n  estoque-pro import <arquivo> [produtos|produtos_estrito|consulta|inventario]\n  estoque-pro sync\n  estoque-pro lookup <codigo>\n  estoque-pro watch\n  estoque-pro export-order [diretorio]\n  estoque-pro export-count [diretorio]",
        APP_NAME, VERSION
    )
}

fn write_export(file: &ExportFile, dir: Option<String>) -> Result<PathBuf> {
    let dir = dir.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    let path = dir.join(&file.file_name);
    std::fs::write(&path, &file.bytes)
        .with_context(|| format!("falha ao gravar {}", path.display()))?;
    Ok(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    i18n::init_from_env();

    let mut args = std::env::args().skip(1);
    let Some(command) = args.next() else {
        println!("{}", usage());
        return Ok(());
    };

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let state = Arc::new(AppState::new(db_path).context("falha ao inicializar o estado")?);

    match command.as_str() {
        "import" => {
            let file = args.next().context("informe o arquivo a importar")?;
            let profile_name = args.next().unwrap_or_else(|| "produtos".to_string());
            let profile = ImportProfile::from_name(&profile_name)
                .with_context(|| format!("perfil de importação desconhecido: {}", profile_name))?;

            let prepared = state.preview_import(Path::new(&file), &profile)?;
            let rejected = prepared.rejected_rows();
            let count = state.commit_import(prepared)?;

            let key = match profile.kind {
                estoque_pro::CatalogKind::Products => "import.success",
                estoque_pro::CatalogKind::Inventory => "import.inventory_success",
            };
            println!("{}", t_with_args(key, &[("count", &count.to_string())]));
            if rejected > 0 {
                println!("{}", t_with_args("import.rejected", &[("count", &rejected.to_string())]));
            }
        }
        "sync" => {
            let report = state.sync(ReportingPolicy::Loud).await;
            if let Some(notification) = report.notification() {
                println!("{}", notification.message);
            }
            report.result?;
        }
        "lookup" => {
            let query = args.next().context("informe o código do produto")?;
            match state.lookup_product(&query)? {
                Some(product) => {
                    println!(
                        "{} | {} | estoque: {} | R$ {:.2}",
                        product.codigo, product.descricao, product.estoque, product.preco
                    );
                    if let Some(ts) = state.products_last_update()? {
                        let date = ts.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string();
                        println!("{}", t_with_args("lookup.last_update", &[("date", &date)]));
                    }
                }
                None => println!("{}", t("lookup.not_found")),
            }
        }
        "watch" => {
            let period = state.config()?.refresh_interval();
            let handle = spawn_background_refresh(Arc::clone(&state), period);
            tokio::signal::ctrl_c()
                .await
                .context("falha ao aguardar Ctrl-C")?;
            handle.abort();
            tracing::info!("后台刷新已停止");
        }
        "export-order" => {
            let (file, draft) = state.export_order()?;
            let path = write_export(&file, args.next())?;
            let total = format!("{:.2}", state.order_total()?);
            println!("{}", t_with_args("order.exported", &[("file", &path.display().to_string())]));
            println!("{}", t_with_args("order.total", &[("total", &total)]));
            println!("{}", draft.mailto_url());
        }
        "export-count" => {
            let file = state.export_count(Local::now())?;
            let path = write_export(&file, args.next())?;
            println!("{}", t_with_args("count.exported", &[("file", &path.display().to_string())]));
        }
        other => {
            eprintln!("comando desconhecido: {}\n\n{}", other, usage());
            std::process::exit(2);
        }
    }

    Ok(())
}
