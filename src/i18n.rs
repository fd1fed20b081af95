// ==========================================
// Rebaixa Pro - 国际化 (i18n)
// ==========================================
// 语言: pt-BR（默认/回退）, en
// 宏初始化见 lib.rs；启动时可由 ESTOQUE_LOCALE 切换
// ==========================================

/// 语言切换环境变量
pub const LOCALE_ENV: &str = "ESTOQUE_LOCALE";

pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言（"pt-BR" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 从环境变量设置语言；未设置时保持默认
pub fn init_from_env() {
    if let Ok(locale) = std::env::var(LOCALE_ENV) {
        let locale = locale.trim();
        if !locale.is_empty() {
            set_locale(locale);
        }
    }
}

pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译并替换 %{name} 占位符
///
/// ```no_run
/// use estoque_pro::i18n::t_with_args;
/// let msg = t_with_args("sync.success", &[("count", "12")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(key), |msg, (name, value)| {
        msg.replace(&format!("%{{{}}}", name), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // locale 为进程级全局状态，相关测试串行执行
    static LOCALE_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_switch_locale() {
        let _guard = LOCALE_LOCK.lock().unwrap();

        set_locale("en");
        assert_eq!(current_locale(), "en");
        assert_eq!(t("sync.skipped"), "An import is already running");

        set_locale("pt-BR");
        assert_eq!(current_locale(), "pt-BR");
        assert_eq!(t("sync.skipped"), "Já existe uma importação em andamento");
    }

    #[test]
    fn test_placeholders_replaced() {
        let _guard = LOCALE_LOCK.lock().unwrap();
        set_locale("pt-BR");

        assert_eq!(
            t_with_args("import.success", &[("count", "2")]),
            "2 produtos importados com sucesso!"
        );
        assert_eq!(
            t_with_args("lookup.last_update", &[("date", "17/10/2026 14:05")]),
            "Atualizado: 17/10/2026 14:05"
        );
    }
}
