// ==========================================
// Rebaixa Pro - 邮件草稿
// ==========================================
// 职责: 补货清单 → 收件人/主题/纯文本表格正文 + 打开方式 URL
// ==========================================

use crate::engine::order_list::OrderList;
use crate::export::error::{ExportError, ExportResult};
use crate::export::spreadsheet::ORDER_FILE_NAME;

pub const ORDER_SUBJECT: &str = "Solicitação de Produtos";
const GMAIL_COMPOSE_URL: &str = "https://mail.google.com/mail/?view=cm&fs=1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailDraft {
    /// 根据补货清单生成邮件草稿
    pub fn for_order(recipient: &str, list: &OrderList) -> ExportResult<Self> {
        if list.is_empty() {
            return Err(ExportError::EmptyList);
        }

        let mut body = String::from(
            "Olá,\n\nSolicito os seguintes produtos conforme lista abaixo:\n\n",
        );
        body.push_str("CÓDIGO | DESCRIÇÃO | QTD | P. ORIGINAL | SUGERIDO\n");
        body.push_str("-------|-----------|-----|-------------|----------\n");
        for item in list.items() {
            body.push_str(&format!(
                "{} | {} | {} | R${:.2} | R${:.2}\n",
                item.codigo, item.descricao, item.quantidade, item.preco_original, item.preco_sugerido
            ));
        }
        body.push_str(&format!("\nTotal de itens: {}\n", list.len()));
        body.push_str(&format!("Valor total: R${:.2}\n\n", list.total_value()));
        body.push_str(&format!(
            "O arquivo \"{}\" foi gerado. Por favor, anexe-o a este e-mail antes de enviar.",
            ORDER_FILE_NAME
        ));

        Ok(Self {
            to: recipient.trim().to_string(),
            subject: ORDER_SUBJECT.to_string(),
            body,
        })
    }

    /// mailto: 链接（系统默认邮件客户端）
    pub fn mailto_url(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            urlencoding::encode(&self.to),
            urlencoding::encode(&self.subject),
            urlencoding::encode(&self.body)
        )
    }

    /// 网页邮箱撰写链接
    pub fn webmail_url(&self) -> String {
        format!(
            "{}&to={}&su={}&body={}",
            GMAIL_COMPOSE_URL,
            urlencoding::encode(&self.to),
            urlencoding::encode(&self.subject),
            urlencoding::encode(&self.body)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::OrderItem;

    fn list() -> OrderList {
        OrderList::from_items(vec![
            OrderItem {
                codigo: "100".to_string(),
                descricao: "Arroz".to_string(),
                quantidade: 2,
                preco_original: 10.0,
                preco_sugerido: 10.0,
            },
            OrderItem {
                codigo: "200".to_string(),
                descricao: "Feijão".to_string(),
                quantidade: 1,
                preco_original: 6.0,
                preco_sugerido: 5.5,
            },
        ])
    }

    #[test]
    fn test_order_email_body() {
        let draft = EmailDraft::for_order(" compras@loja.com ", &list()).unwrap();

        assert_eq!(draft.to, "compras@loja.com");
        assert_eq!(draft.subject, "Solicitação de Produtos");
        assert!(draft.body.contains("200 | Feijão | 1 | R$6.00 | R$5.50\n"));
        assert!(draft.body.contains("Total de itens: 2"));
        assert!(draft.body.contains("Valor total: R$25.50"));
    }

    #[test]
    fn test_urls_are_encoded() {
        let draft = EmailDraft::for_order("a@b.com", &list()).unwrap();

        let webmail = draft.webmail_url();
        assert!(webmail.starts_with("https://mail.google.com/mail/?view=cm&fs=1&to=a%40b.com&su="));
        assert!(!webmail.contains(' '));

        let mailto = draft.mailto_url();
        assert!(mailto.starts_with("mailto:a%40b.com?subject=Solicita%C3%A7%C3%A3o%20de%20Produtos"));
    }

    #[test]
    fn test_empty_list_has_no_draft() {
        assert!(matches!(
            EmailDraft::for_order("a@b.com", &OrderList::new()),
            Err(ExportError::EmptyList)
        ));
    }
}
